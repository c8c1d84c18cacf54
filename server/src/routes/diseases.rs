//! Disease listing endpoint

use axum::{extract::State, Json};

use leaf_disease::api::DiseaseEntry;

use crate::state::SharedState;

/// GET /diseases - All known diseases in classifier output order
pub async fn list_diseases(State(state): State<SharedState>) -> Json<Vec<DiseaseEntry>> {
    let predictor = &state.predictor;

    let entries = predictor
        .catalog()
        .ordered(predictor.class_index())
        .into_iter()
        .map(|(index, record)| DiseaseEntry {
            index,
            name: record.name.clone(),
            description: record.description.clone(),
            treatment: record.treatment.clone(),
        })
        .collect();

    Json(entries)
}
