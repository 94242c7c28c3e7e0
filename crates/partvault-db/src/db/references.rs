use chrono::Utc;
use partvault_core::{
    models::{Cardinality, ComponentField, FileCategory, FileReference},
    AppError,
};
use sqlx::{Sqlite, SqlitePool};

/// One row of a component file listing: the reference joined with the
/// registry's size mirror.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ComponentFileRow {
    pub field: ComponentField,
    pub category: FileCategory,
    pub file_name: String,
    pub file_size: i64,
}

/// Repository for component-to-file associations
#[derive(Clone)]
pub struct ReferenceRepository {
    pool: SqlitePool,
}

impl ReferenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All references of a component, ordered per field by insertion order.
    #[tracing::instrument(skip(self), fields(db.table = "component_file_refs", db.operation = "select"))]
    pub async fn list_references(
        &self,
        component_id: &str,
    ) -> Result<Vec<FileReference>, AppError> {
        let refs = sqlx::query_as::<Sqlite, FileReference>(
            "SELECT component_id, field, category, file_name, position, created_at
             FROM component_file_refs
             WHERE component_id = ?
             ORDER BY field ASC, position ASC",
        )
        .bind(component_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(refs)
    }

    /// Component file listing joined with registry sizes (absent registry
    /// rows report size 0 rather than dropping the reference).
    #[tracing::instrument(skip(self), fields(db.table = "component_file_refs", db.operation = "select"))]
    pub async fn list_component_files(
        &self,
        component_id: &str,
    ) -> Result<Vec<ComponentFileRow>, AppError> {
        let rows = sqlx::query_as::<Sqlite, ComponentFileRow>(
            r#"
            SELECT r.field, r.category, r.file_name, COALESCE(cf.file_size, 0) AS file_size
            FROM component_file_refs r
            LEFT JOIN cad_files cf
                ON cf.category = r.category AND cf.file_name = r.file_name
            WHERE r.component_id = ?
            ORDER BY r.field ASC, r.position ASC
            "#,
        )
        .bind(component_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Attach a file to a component field.
    ///
    /// Fails with `CardinalityViolation` when the field is single-valued and
    /// already occupied (even by the same filename), and with
    /// `DuplicateReference` when this exact association already exists.
    #[tracing::instrument(skip(self), fields(db.table = "component_file_refs", db.operation = "insert", field = %field))]
    pub async fn add_reference(
        &self,
        component_id: &str,
        field: ComponentField,
        file_name: &str,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if field.cardinality() == Cardinality::Single {
            let occupied = sqlx::query_scalar::<Sqlite, bool>(
                "SELECT EXISTS(SELECT 1 FROM component_file_refs WHERE component_id = ? AND field = ?)",
            )
            .bind(component_id)
            .bind(field)
            .fetch_one(&mut *tx)
            .await?;

            if occupied {
                return Err(AppError::CardinalityViolation {
                    component_id: component_id.to_string(),
                    field,
                });
            }
        }

        let duplicate = sqlx::query_scalar::<Sqlite, bool>(
            "SELECT EXISTS(SELECT 1 FROM component_file_refs
             WHERE component_id = ? AND field = ? AND file_name = ?)",
        )
        .bind(component_id)
        .bind(field)
        .bind(file_name)
        .fetch_one(&mut *tx)
        .await?;

        if duplicate {
            return Err(AppError::DuplicateReference {
                component_id: component_id.to_string(),
                field,
                file_name: file_name.to_string(),
            });
        }

        let next_position = sqlx::query_scalar::<Sqlite, i64>(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM component_file_refs
             WHERE component_id = ? AND field = ?",
        )
        .bind(component_id)
        .bind(field)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO component_file_refs (component_id, field, category, file_name, position, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(component_id)
        .bind(field)
        .bind(field.category())
        .bind(file_name)
        .bind(next_position)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Whether this exact association exists.
    #[tracing::instrument(skip(self), fields(db.table = "component_file_refs", db.operation = "select", field = %field))]
    pub async fn has_reference(
        &self,
        component_id: &str,
        field: ComponentField,
        file_name: &str,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Sqlite, bool>(
            "SELECT EXISTS(SELECT 1 FROM component_file_refs
             WHERE component_id = ? AND field = ? AND file_name = ?)",
        )
        .bind(component_id)
        .bind(field)
        .bind(file_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Detach a file from a component field. Idempotent: removing an absent
    /// reference is a no-op. Returns whether a row was removed.
    #[tracing::instrument(skip(self), fields(db.table = "component_file_refs", db.operation = "delete", field = %field))]
    pub async fn remove_reference(
        &self,
        component_id: &str,
        field: ComponentField,
        file_name: &str,
    ) -> Result<bool, AppError> {
        let rows_affected = sqlx::query(
            "DELETE FROM component_file_refs
             WHERE component_id = ? AND field = ? AND file_name = ?",
        )
        .bind(component_id)
        .bind(field)
        .bind(file_name)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Remove every reference to one stored file, across all components.
    #[tracing::instrument(skip(self), fields(db.table = "component_file_refs", db.operation = "delete"))]
    pub async fn remove_all_for_file(
        &self,
        category: FileCategory,
        file_name: &str,
    ) -> Result<u64, AppError> {
        let rows_affected = sqlx::query(
            "DELETE FROM component_file_refs WHERE category = ? AND file_name = ?",
        )
        .bind(category)
        .bind(file_name)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }

    /// The blast-radius query: which components reference this file.
    #[tracing::instrument(skip(self), fields(db.table = "component_file_refs", db.operation = "select"))]
    pub async fn find_components_referencing(
        &self,
        category: FileCategory,
        file_name: &str,
    ) -> Result<Vec<String>, AppError> {
        let components = sqlx::query_scalar::<Sqlite, String>(
            "SELECT DISTINCT component_id FROM component_file_refs
             WHERE category = ? AND file_name = ?
             ORDER BY component_id ASC",
        )
        .bind(category)
        .bind(file_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(components)
    }

    /// Distinct filenames referenced in a category (for orphan detection).
    #[tracing::instrument(skip(self), fields(db.table = "component_file_refs", db.operation = "select"))]
    pub async fn referenced_names(
        &self,
        category: FileCategory,
    ) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<Sqlite, String>(
            "SELECT DISTINCT file_name FROM component_file_refs WHERE category = ?",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Logical rewrite: repoint references from `old_file_name` to
    /// `new_file_name` without touching the registry. `components = None`
    /// means every currently-referencing component. Transactional; returns
    /// the number of distinct components updated.
    #[tracing::instrument(skip(self, components), fields(db.table = "component_file_refs", db.operation = "update"))]
    pub async fn rewrite_refs(
        &self,
        category: FileCategory,
        old_file_name: &str,
        new_file_name: &str,
        components: Option<&[String]>,
    ) -> Result<u64, AppError> {
        if let Some(ids) = components {
            if ids.is_empty() {
                return Ok(0);
            }
        }

        let mut tx = self.pool.begin().await?;

        let updated = Self::rewrite_in_tx(
            &mut tx,
            category,
            old_file_name,
            new_file_name,
            components,
        )
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Physical-rename cascade: rename the registry row and repoint every
    /// reference, in one transaction. Returns the number of distinct
    /// components updated.
    #[tracing::instrument(skip(self), fields(db.table = "component_file_refs", db.operation = "update"))]
    pub async fn rewrite_cascade(
        &self,
        category: FileCategory,
        old_file_name: &str,
        new_file_name: &str,
    ) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE cad_files SET file_name = ?, updated_at = ? WHERE category = ? AND file_name = ?",
        )
        .bind(new_file_name)
        .bind(Utc::now())
        .bind(category)
        .bind(old_file_name)
        .execute(&mut *tx)
        .await?;

        let updated =
            Self::rewrite_in_tx(&mut tx, category, old_file_name, new_file_name, None).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn rewrite_in_tx(
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        category: FileCategory,
        old_file_name: &str,
        new_file_name: &str,
        components: Option<&[String]>,
    ) -> Result<u64, AppError> {
        let (count_sql, update_sql) = match components {
            None => (
                "SELECT COUNT(DISTINCT component_id) FROM component_file_refs
                 WHERE category = ? AND file_name = ?"
                    .to_string(),
                "UPDATE component_file_refs SET file_name = ?
                 WHERE category = ? AND file_name = ?"
                    .to_string(),
            ),
            Some(ids) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                (
                    format!(
                        "SELECT COUNT(DISTINCT component_id) FROM component_file_refs
                         WHERE category = ? AND file_name = ? AND component_id IN ({})",
                        placeholders
                    ),
                    format!(
                        "UPDATE component_file_refs SET file_name = ?
                         WHERE category = ? AND file_name = ? AND component_id IN ({})",
                        placeholders
                    ),
                )
            }
        };

        let mut count_query = sqlx::query_scalar::<Sqlite, i64>(&count_sql)
            .bind(category)
            .bind(old_file_name);
        if let Some(ids) = components {
            for id in ids {
                count_query = count_query.bind(id);
            }
        }
        let updated = count_query.fetch_one(&mut **tx).await?;

        let mut update_query = sqlx::query(&update_sql)
            .bind(new_file_name)
            .bind(category)
            .bind(old_file_name);
        if let Some(ids) = components {
            for id in ids {
                update_query = update_query.bind(id);
            }
        }
        update_query.execute(&mut **tx).await?;

        Ok(updated as u64)
    }
}
