/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool (customers), objects: ObjectStore (files), verifier: IdentityVerifier
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - リクエスト間で共有する可変状態は持たない
 */
use std::sync::Arc;

use crate::services::{identity::IdentityVerifier, storage::ObjectStore};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub objects: Arc<dyn ObjectStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(
        db: sqlx::PgPool,
        objects: Arc<dyn ObjectStore>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            db,
            objects,
            verifier,
        }
    }
}
