//! In-process stand-in for the chapter document API
//!
//! Behaves like the REST server (same envelopes, server-assigned exercise
//! ids, 404 on unknown ids) and can be switched offline or told to refuse
//! saves, so gateway and session behaviour can be exercised without HTTP.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, MutexGuard};

use super::models::{ApiEnvelope, NewExerciseBody};
use super::RemoteDocument;
use crate::content::{Chapter, Exercise};
use crate::error::NetworkError;

#[derive(Debug, Default)]
struct DocumentState {
    chapters: Vec<Chapter>,
    bare_array: bool,
    offline: bool,
    timing_out: bool,
    fail_reads: bool,
    refuse_saves: Option<String>,
    next_exercise: u64,
    requests: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDocument {
    state: Arc<Mutex<DocumentState>>,
}

impl InMemoryDocument {
    pub fn new(chapters: Vec<Chapter>) -> Self {
        let document = Self::default();
        document.state().chapters = chapters;
        document
    }

    /// Serve `GET /chapters` as a bare array instead of `{chapitres: [...]}`
    pub fn serve_bare_array(self, bare: bool) -> Self {
        self.state().bare_array = bare;
        self
    }

    fn state(&self) -> MutexGuard<'_, DocumentState> {
        // A poisoned lock only means a test panicked mid-request; the data is still usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    pub fn set_timing_out(&self, timing_out: bool) {
        self.state().timing_out = timing_out;
    }

    /// Fail `GET /chapters` while writes keep going through
    pub fn fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Answer saves with `{success: false, error}` until cleared with `None`
    pub fn refuse_saves(&self, reason: Option<&str>) {
        self.state().refuse_saves = reason.map(str::to_string);
    }

    pub fn chapters(&self) -> Vec<Chapter> {
        self.state().chapters.clone()
    }

    /// Replace the stored document, as another client saving would
    pub fn overwrite(&self, chapters: Vec<Chapter>) {
        self.state().chapters = chapters;
    }

    /// `METHOD path` of every request received so far
    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    fn begin(&self, request: String) -> Result<MutexGuard<'_, DocumentState>, NetworkError> {
        let mut state = self.state();
        let url = format!("memory://{}", request.split_once(' ').map_or("", |(_, path)| path));
        state.requests.push(request);
        if state.timing_out {
            return Err(NetworkError::Timeout { url });
        }
        if state.offline {
            return Err(NetworkError::Unreachable {
                url,
                message: "document is offline".to_string(),
            });
        }
        Ok(state)
    }

    fn not_found(path: &str, what: &str) -> NetworkError {
        NetworkError::Status {
            url: format!("memory://{}", path),
            status: 404,
            message: format!("{} not found", what),
        }
    }

    fn exercise_mut<'a>(state: &'a mut DocumentState, id: &str) -> Option<&'a mut Vec<Exercise>> {
        state
            .chapters
            .iter_mut()
            .flat_map(|chapter| chapter.etapes.iter_mut())
            .map(|step| &mut step.exercices)
            .find(|exercises| exercises.iter().any(|exercise| exercise.id == id))
    }
}

#[async_trait]
impl RemoteDocument for InMemoryDocument {
    async fn fetch_document(&self) -> Result<Value, NetworkError> {
        let state = self.begin("GET chapters".to_string())?;
        if state.fail_reads {
            return Err(NetworkError::Unreachable {
                url: "memory://chapters".to_string(),
                message: "reads are failing".to_string(),
            });
        }
        let chapters = serde_json::to_value(&state.chapters).map_err(|e| NetworkError::Decode {
            url: "memory://chapters".to_string(),
            message: e.to_string(),
        })?;
        Ok(if state.bare_array {
            chapters
        } else {
            json!({ "chapitres": chapters })
        })
    }

    async fn save_chapters(&self, chapters: &[Chapter]) -> Result<ApiEnvelope, NetworkError> {
        let mut state = self.begin("POST chapters".to_string())?;
        if let Some(reason) = &state.refuse_saves {
            return Ok(ApiEnvelope::failed(reason.clone()));
        }
        state.chapters = chapters.to_vec();
        Ok(ApiEnvelope::ok(format!("{} chapitres sauvegardés", chapters.len())))
    }

    async fn create_exercise(
        &self,
        step_id: &str,
        body: &NewExerciseBody,
    ) -> Result<Value, NetworkError> {
        let path = format!("steps/{}/exercises", step_id);
        let mut state = self.begin(format!("POST {}", path))?;

        state.next_exercise += 1;
        let id = format!("srv_{}", state.next_exercise);
        let value = body.clone().into_exercise_value(&id);
        let exercise: Exercise = serde_json::from_value(value.clone()).map_err(|e| {
            NetworkError::Status {
                url: format!("memory://{}", path),
                status: 400,
                message: e.to_string(),
            }
        })?;

        let step = state
            .chapters
            .iter_mut()
            .flat_map(|chapter| chapter.etapes.iter_mut())
            .find(|step| step.id == step_id)
            .ok_or_else(|| Self::not_found(&path, "step"))?;
        step.exercices.push(exercise);

        Ok(value)
    }

    async fn update_exercise(&self, exercise: &Exercise) -> Result<Value, NetworkError> {
        let path = format!("exercises/{}", exercise.id);
        let mut state = self.begin(format!("PUT {}", path))?;

        let exercises = Self::exercise_mut(&mut state, &exercise.id)
            .ok_or_else(|| Self::not_found(&path, "exercise"))?;
        if let Some(slot) = exercises.iter_mut().find(|e| e.id == exercise.id) {
            *slot = exercise.clone();
        }

        serde_json::to_value(exercise).map_err(|e| NetworkError::Decode {
            url: format!("memory://{}", path),
            message: e.to_string(),
        })
    }

    async fn delete_exercise(&self, exercise_id: &str) -> Result<ApiEnvelope, NetworkError> {
        let path = format!("exercises/{}", exercise_id);
        let mut state = self.begin(format!("DELETE {}", path))?;

        let exercises = Self::exercise_mut(&mut state, exercise_id)
            .ok_or_else(|| Self::not_found(&path, "exercise"))?;
        exercises.retain(|exercise| exercise.id != exercise_id);

        Ok(ApiEnvelope::ok("Exercice supprimé"))
    }

    fn describe(&self) -> String {
        "memory://".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Chapter> {
        serde_json::from_value(json!([{
            "id": "ch1", "titre": "Douane",
            "etapes": [{"id": "e1", "titre": "Intro", "exercices": [
                {"id": "x1", "type": "texte", "question": "Pourquoi?"}
            ]}]
        }]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_document_shapes() {
        let wrapped = InMemoryDocument::new(sample());
        assert!(wrapped.fetch_document().await.unwrap()["chapitres"].is_array());

        let bare = InMemoryDocument::new(sample()).serve_bare_array(true);
        assert!(bare.fetch_document().await.unwrap().is_array());
    }

    #[tokio::test]
    async fn test_exercise_endpoints() {
        let document = InMemoryDocument::new(sample());
        let exercise: Exercise = serde_json::from_value(json!({
            "type": "texte", "question": "Comment?", "titre": "Procédure"
        }))
        .unwrap();

        let body = NewExerciseBody::from_exercise(&exercise).unwrap();
        let created = document.create_exercise("e1", &body).await.unwrap();
        assert_eq!(created["id"], "srv_1");
        assert_eq!(document.chapters()[0].etapes[0].exercices.len(), 2);

        let missing = document.create_exercise("nope", &body).await.unwrap_err();
        assert!(matches!(missing, NetworkError::Status { status: 404, .. }));

        document.delete_exercise("x1").await.unwrap();
        assert_eq!(document.chapters()[0].etapes[0].exercices.len(), 1);
        assert!(document.delete_exercise("x1").await.is_err());
    }

    #[tokio::test]
    async fn test_offline_and_timeouts() {
        let document = InMemoryDocument::new(sample());
        document.set_offline(true);
        assert!(matches!(
            document.fetch_document().await,
            Err(NetworkError::Unreachable { .. })
        ));

        document.set_offline(false);
        document.set_timing_out(true);
        assert!(document.save_chapters(&[]).await.unwrap_err().is_timeout());
        assert_eq!(document.chapters().len(), 1);
        assert_eq!(document.requests(), vec!["GET chapters", "POST chapters"]);
    }
}
