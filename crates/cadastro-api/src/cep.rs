//! Handler for `GET /cep/{cep}` — a thin proxy over the configured resolver
//! so the frontend can pre-fill addresses without talking to ViaCEP itself.

use axum::{
  Json,
  extract::{Path, State},
};
use cadastro_core::{
  cep::{CepInfo, CepResolver},
  store::RegistryStore,
};

use crate::{AppState, error::ApiError};

/// `GET /cep/:cep`
pub async fn lookup<S, C>(
  State(state): State<AppState<S, C>>,
  Path(cep): Path<String>,
) -> Result<Json<CepInfo>, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let info = state.cep.resolve(&cep).await?;
  Ok(Json(info))
}
