/*
 * Responsibility
 * - public middleware surface (re-export)
 */
pub mod auth;
pub mod cors;
