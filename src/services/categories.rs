use uuid::Uuid;

use crate::error::Result;
use crate::models::Category;
use crate::repo::category::CategoryRepository;

#[derive(Clone)]
pub struct CategoryRegistry {
    categories: CategoryRepository,
}

impl CategoryRegistry {
    pub fn new(categories: CategoryRepository) -> Self {
        Self { categories }
    }

    /// Adds a category at `order_index`, or after the categories currently
    /// stored when the caller gives none. Blank titles create nothing.
    ///
    /// The index is not reserved atomically; concurrent creators can share one.
    pub async fn create_category(
        &self,
        board_id: Uuid,
        title: &str,
        order_index: Option<i32>,
    ) -> Result<Option<Category>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let order_index = match order_index {
            Some(index) => index,
            None => i32::try_from(self.categories.count_by_board(board_id).await?)
                .unwrap_or(i32::MAX),
        };

        let category = self.categories.create(board_id, title, order_index).await?;
        tracing::info!(%board_id, category_id = %category.id, order_index, "Created category");
        Ok(Some(category))
    }

    pub async fn delete_category(&self, category_id: Uuid) -> Result<()> {
        self.categories.delete(category_id).await?;
        tracing::info!(%category_id, "Deleted category");
        Ok(())
    }

    /// Categories of a board by `order_index`. Read failures yield an empty list.
    pub async fn list_categories(&self, board_id: Uuid) -> Vec<Category> {
        match self.categories.list_by_board(board_id).await {
            Ok(categories) => categories,
            Err(e) => {
                tracing::error!(%board_id, error = %e, "Failed to list categories");
                Vec::new()
            }
        }
    }

    pub async fn get(&self, category_id: Uuid) -> Result<Category> {
        self.categories.get_by_id(category_id).await
    }
}
