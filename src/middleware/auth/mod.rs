/*
 * Responsibility
 * - gate: bearer ID token を検証して AuthCtx を載せる (全リクエスト)
 * - access: protected route で AuthCtx の有無 / authority を確認する
 */
pub mod access;
pub mod gate;
