// Remote moderation classifiers.

pub mod huggingface_client;
pub mod openai_client;

pub use huggingface_client::{HuggingFaceClassifier, DEFAULT_HUGGINGFACE_URL};
pub use openai_client::{OpenAiModerationClient, DEFAULT_OPENAI_BASE_URL};
