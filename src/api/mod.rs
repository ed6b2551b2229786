//! Remote chapter document: the REST client and the port it implements

pub mod client;
pub mod constants;
pub mod memory;
pub mod models;
pub mod resilience;

pub use client::ContentApiClient;
pub use memory::InMemoryDocument;
pub use models::{ApiEnvelope, NewExerciseBody};
pub use resilience::{ResilienceConfig, RetryConfig, RetryPolicy};

use async_trait::async_trait;
use serde_json::Value;

use crate::content::{Chapter, Exercise};
use crate::error::NetworkError;

/// Everything the persistence gateway needs from the authoritative document
#[async_trait]
pub trait RemoteDocument: Send + Sync {
    /// `GET /chapters`, raw body (`{chapitres: [...]}` or a bare array)
    async fn fetch_document(&self) -> Result<Value, NetworkError>;

    /// `POST /chapters` with the whole collection
    async fn save_chapters(&self, chapters: &[Chapter]) -> Result<ApiEnvelope, NetworkError>;

    /// `POST /steps/{stepId}/exercises`, returns the created exercise
    async fn create_exercise(
        &self,
        step_id: &str,
        body: &NewExerciseBody,
    ) -> Result<Value, NetworkError>;

    /// `PUT /exercises/{id}` with the full exercise
    async fn update_exercise(&self, exercise: &Exercise) -> Result<Value, NetworkError>;

    /// `DELETE /exercises/{id}`
    async fn delete_exercise(&self, exercise_id: &str) -> Result<ApiEnvelope, NetworkError>;

    /// Where this document lives, for log and status lines
    fn describe(&self) -> String;
}
