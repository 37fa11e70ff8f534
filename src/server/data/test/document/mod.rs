use crate::server::data::document::DocumentRepository;
use sea_orm::{DbErr, EntityTrait, PaginatorTrait};
use serde_json::json;
use test_utils::{builder::TestBuilder, factory};

mod bulk_create;
mod create;
mod delete;
mod find;
