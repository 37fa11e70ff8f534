pub mod backup_retention;
