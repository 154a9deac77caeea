pub mod chat_service;
pub mod llm_service;
pub mod scheduler;
pub mod usage_service;
