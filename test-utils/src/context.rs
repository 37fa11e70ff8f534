use sea_orm::{sea_query::TableCreateStatement, ConnectionTrait, Database, DatabaseConnection};

use crate::{error::TestError, fs::TestFs};

/// Test context containing database connection and filesystem roots.
///
/// Provides an in-memory SQLite database connection and a temporary directory tree for
/// isolated unit and integration testing. Both are created lazily on first access and
/// persist for the lifetime of the test context; the directory tree is removed on drop.
pub struct TestContext {
    /// Optional database connection to in-memory SQLite instance.
    ///
    /// Initialized lazily when `database()` is first called. Using `Option` allows
    /// deferred connection until actually needed by the test.
    pub db: Option<DatabaseConnection>,

    /// Optional temporary filesystem with assets, backups, and scratch roots.
    ///
    /// Initialized lazily when `filesystem()` is first called.
    pub fs: Option<TestFs>,
}

impl TestContext {
    /// Creates a new empty test context.
    ///
    /// # Returns
    /// - New `TestContext` instance with no database connection or filesystem
    pub fn new() -> Self {
        Self { db: None, fs: None }
    }

    /// Gets or creates the in-memory SQLite database connection.
    ///
    /// Returns a reference to the existing database connection if one exists, otherwise
    /// creates a new in-memory SQLite database and stores the connection. The connection
    /// persists for the lifetime of this test context.
    ///
    /// # Returns
    /// - `Ok(&DatabaseConnection)` - Reference to the database connection
    /// - `Err(TestError::Database)` - Failed to connect to in-memory SQLite database
    pub async fn database(&mut self) -> Result<&DatabaseConnection, TestError> {
        match self.db {
            Some(ref db) => Ok(db),
            None => {
                let db = Database::connect("sqlite::memory:").await?;

                let db_ref = self.db.insert(db);

                Ok(&*db_ref) // Re-borrow as immutable
            }
        }
    }

    /// Creates database tables from the provided CREATE TABLE statements.
    ///
    /// Executes each CREATE TABLE statement in sequence. Typically called internally by
    /// `TestBuilder::build()` rather than directly.
    ///
    /// # Arguments
    /// - `stmts` - Vector of CREATE TABLE statements to execute
    ///
    /// # Returns
    /// - `Ok(())` - All tables created successfully
    /// - `Err(TestError::Database)` - Failed to create one or more tables
    pub async fn with_tables(&mut self, stmts: Vec<TableCreateStatement>) -> Result<(), TestError> {
        let db = self.database().await?;

        for stmt in stmts {
            db.execute(&stmt).await?;
        }

        Ok(())
    }

    /// Gets or creates the temporary filesystem roots.
    ///
    /// # Returns
    /// - `Ok(&TestFs)` - Reference to the filesystem roots
    /// - `Err(TestError::Io)` - Failed to create the temporary directory tree
    pub fn filesystem(&mut self) -> Result<&TestFs, TestError> {
        match self.fs {
            Some(ref fs) => Ok(fs),
            None => {
                let fs = TestFs::new()?;
                Ok(&*self.fs.insert(fs))
            }
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
