pub mod db;
pub mod http;
pub mod rest_store;
pub mod script_llm;
pub mod storage;
pub mod tts;

pub use db::DbAdapter;
pub use http::{build_http_client, BaasClient};
pub use rest_store::RestStore;
pub use script_llm::OpenAiScriptAdapter;
pub use storage::BucketStorage;
pub use tts::ElevenLabsTtsAdapter;
