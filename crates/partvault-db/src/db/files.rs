use partvault_core::{
    models::{AvailableFile, CadFile, FileCategory},
    AppError,
};
use sqlx::{Sqlite, SqlitePool};

/// Repository for the stored-file registry
#[derive(Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a registry row for a stored file. Upsert keyed on
    /// (category, file_name) so re-uploads and overwrite-puts refresh size
    /// and hash instead of failing on the unique constraint.
    #[tracing::instrument(skip(self, file), fields(db.table = "cad_files", db.operation = "insert", file_name = %file.file_name))]
    pub async fn upsert(&self, file: &CadFile) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO cad_files (id, category, file_name, file_size, content_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (category, file_name) DO UPDATE SET
                file_size = excluded.file_size,
                content_hash = excluded.content_hash,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(file.id)
        .bind(file.category)
        .bind(&file.file_name)
        .bind(file.file_size)
        .bind(&file.content_hash)
        .bind(file.created_at)
        .bind(file.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "cad_files", db.operation = "select"))]
    pub async fn get(
        &self,
        category: FileCategory,
        file_name: &str,
    ) -> Result<Option<CadFile>, AppError> {
        let file = sqlx::query_as::<Sqlite, CadFile>(
            "SELECT id, category, file_name, file_size, content_hash, created_at, updated_at
             FROM cad_files WHERE category = ? AND file_name = ?",
        )
        .bind(category)
        .bind(file_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    /// Remove a registry row. Idempotent. Registry renames have no
    /// standalone entry point: the physical-rename cascade rewrites the row
    /// in the same transaction as the references (see ReferenceRepository).
    #[tracing::instrument(skip(self), fields(db.table = "cad_files", db.operation = "delete"))]
    pub async fn delete(
        &self,
        category: FileCategory,
        file_name: &str,
    ) -> Result<bool, AppError> {
        let rows_affected =
            sqlx::query("DELETE FROM cad_files WHERE category = ? AND file_name = ?")
                .bind(category)
                .bind(file_name)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows_affected > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "cad_files", db.operation = "select"))]
    pub async fn list(&self, category: FileCategory) -> Result<Vec<CadFile>, AppError> {
        let files = sqlx::query_as::<Sqlite, CadFile>(
            "SELECT id, category, file_name, file_size, content_hash, created_at, updated_at
             FROM cad_files WHERE category = ? ORDER BY file_name ASC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    /// Substring search over filenames across all categories.
    #[tracing::instrument(skip(self), fields(db.table = "cad_files", db.operation = "select"))]
    pub async fn search(&self, query: &str) -> Result<Vec<CadFile>, AppError> {
        let pattern = format!("%{}%", escape_like(query));
        let files = sqlx::query_as::<Sqlite, CadFile>(
            r#"
            SELECT id, category, file_name, file_size, content_hash, created_at, updated_at
            FROM cad_files
            WHERE file_name LIKE ? ESCAPE '\'
            ORDER BY category ASC, file_name ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    /// Picker listing: stored files with their current reference counts,
    /// optionally narrowed to one category and/or a filename substring.
    #[tracing::instrument(skip(self), fields(db.table = "cad_files", db.operation = "select"))]
    pub async fn list_available(
        &self,
        category: Option<FileCategory>,
        query: Option<&str>,
    ) -> Result<Vec<AvailableFile>, AppError> {
        let mut sql = String::from(
            r#"
            SELECT cf.id, cf.file_name, cf.category AS file_type,
                   COUNT(r.component_id) AS component_count
            FROM cad_files cf
            LEFT JOIN component_file_refs r
                ON r.category = cf.category AND r.file_name = cf.file_name
            "#,
        );

        let mut conditions: Vec<&str> = Vec::new();
        if category.is_some() {
            conditions.push("cf.category = ?");
        }
        if query.is_some() {
            conditions.push("cf.file_name LIKE ? ESCAPE '\\'");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" GROUP BY cf.id, cf.file_name, cf.category ORDER BY cf.file_name ASC");

        let mut query_builder = sqlx::query_as::<Sqlite, AvailableFile>(&sql);
        if let Some(cat) = category {
            query_builder = query_builder.bind(cat);
        }
        if let Some(q) = query {
            query_builder = query_builder.bind(format!("%{}%", escape_like(q)));
        }

        let files = query_builder.fetch_all(&self.pool).await?;

        Ok(files)
    }
}

/// Escape LIKE wildcards in user-supplied search input.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        run_migrations(&pool).await.expect("Failed to run migrations");
        pool
    }

    #[tokio::test]
    async fn test_upsert_refreshes_existing_row() {
        let repo = FileRepository::new(test_pool().await);

        let first = CadFile::new(FileCategory::Footprint, "F.kicad_mod", 10, None);
        repo.upsert(&first).await.unwrap();

        let second = CadFile::new(
            FileCategory::Footprint,
            "F.kicad_mod",
            20,
            Some("abc123".into()),
        );
        repo.upsert(&second).await.unwrap();

        let stored = repo
            .get(FileCategory::Footprint, "F.kicad_mod")
            .await
            .unwrap()
            .unwrap();
        // Identity is kept from the first insert; metadata is refreshed.
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.file_size, 20);
        assert_eq!(stored.content_hash.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = FileRepository::new(test_pool().await);

        let file = CadFile::new(FileCategory::Pad, "PAD1.pad", 4, None);
        repo.upsert(&file).await.unwrap();

        assert!(repo.delete(FileCategory::Pad, "PAD1.pad").await.unwrap());
        assert!(repo.get(FileCategory::Pad, "PAD1.pad").await.unwrap().is_none());
        assert!(!repo.delete(FileCategory::Pad, "PAD1.pad").await.unwrap());
    }

    #[tokio::test]
    async fn test_search_escapes_wildcards() {
        let repo = FileRepository::new(test_pool().await);

        repo.upsert(&CadFile::new(FileCategory::Symbol, "op_amp.lib", 1, None))
            .await
            .unwrap();
        repo.upsert(&CadFile::new(FileCategory::Symbol, "opXamp.lib", 1, None))
            .await
            .unwrap();

        let hits = repo.search("op_a").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_name, "op_amp.lib");
    }

    #[tokio::test]
    async fn test_list_available_counts_references() {
        let pool = test_pool().await;
        let repo = FileRepository::new(pool.clone());
        let refs = crate::ReferenceRepository::new(pool);

        repo.upsert(&CadFile::new(FileCategory::Footprint, "shared.kicad_mod", 1, None))
            .await
            .unwrap();
        repo.upsert(&CadFile::new(FileCategory::Footprint, "unused.kicad_mod", 1, None))
            .await
            .unwrap();

        use partvault_core::models::ComponentField;
        refs.add_reference("CMP-A", ComponentField::PcbFootprint, "shared.kicad_mod")
            .await
            .unwrap();
        refs.add_reference("CMP-B", ComponentField::PcbFootprint, "shared.kicad_mod")
            .await
            .unwrap();

        let available = repo
            .list_available(Some(FileCategory::Footprint), None)
            .await
            .unwrap();
        assert_eq!(available.len(), 2);
        let shared = available
            .iter()
            .find(|f| f.file_name == "shared.kicad_mod")
            .unwrap();
        assert_eq!(shared.component_count, 2);
        let unused = available
            .iter()
            .find(|f| f.file_name == "unused.kicad_mod")
            .unwrap();
        assert_eq!(unused.component_count, 0);
    }
}
