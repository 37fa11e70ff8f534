mod document;
mod entity_ref;
