pub mod http_detection_service;
