pub mod chat;
pub mod knowledge_base;
pub mod shared;

pub use chat::ChatView;
pub use knowledge_base::KnowledgeBaseView;
