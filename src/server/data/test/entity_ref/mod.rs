use crate::server::data::entity_ref::EntityRefRepository;
use sea_orm::{DbErr, EntityTrait, PaginatorTrait};
use test_utils::{builder::TestBuilder, factory};

mod get;
mod rise;
