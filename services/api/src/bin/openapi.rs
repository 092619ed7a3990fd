//! services/api/src/bin/openapi.rs
//!
//! Dumps the OpenAPI document for the podcast endpoints (the generation
//! trigger, episode listing, today's episode and health) without starting the
//! server. The output path defaults to `openapi.json`.

use podcast_api::web::rest::ApiDoc;
use utoipa::OpenApi;

fn write_document(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(path, json)?;
    println!("Wrote the podcast API document to {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    write_document(&path)
}
