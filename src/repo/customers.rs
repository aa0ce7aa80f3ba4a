//! Customer CRUD repository.
//!
//! Every mutation is followed by a full list refetch - the refreshed
//! list is the return value, so the caller's view always matches the
//! remote store after a write, at the cost of one extra round trip.
//! Failures carry a prefixed context message and are returned to the
//! caller (the form overlay stays open and shows the error).

use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::models::{Customer, CustomerInput, CustomerRecord};
use crate::utils::contains_ignore_case;

#[derive(Clone)]
pub struct CustomerRepository {
    api: ApiClient,
}

impl CustomerRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetch and translate the full customer list.
    pub async fn list(&self) -> Result<Vec<Customer>> {
        let records = self
            .api
            .fetch_customer_records()
            .await
            .context("Failed to load customers")?;
        Ok(records.into_iter().map(CustomerRecord::into_customer).collect())
    }

    pub async fn create(&self, input: &CustomerInput) -> Result<Vec<Customer>> {
        self.api
            .insert_customer(&input.to_payload())
            .await
            .context("Failed to create customer")?;
        self.list().await
    }

    pub async fn update(&self, id: &str, input: &CustomerInput) -> Result<Vec<Customer>> {
        self.api
            .update_customer(id, &input.to_payload())
            .await
            .context("Failed to update customer")?;
        self.list().await
    }

    /// Delete a customer. Callers are responsible for the confirmation
    /// step before reaching this.
    pub async fn delete(&self, id: &str) -> Result<Vec<Customer>> {
        self.api
            .delete_customer(id)
            .await
            .context("Failed to delete customer")?;
        self.list().await
    }
}

/// Filter the in-memory list by name or kana substring,
/// case-insensitively. Never touches the remote store.
pub fn search<'a>(customers: &'a [Customer], query: &str) -> Vec<&'a Customer> {
    let query = query.trim();
    if query.is_empty() {
        return customers.iter().collect();
    }
    customers
        .iter()
        .filter(|c| contains_ignore_case(&c.name, query) || contains_ignore_case(&c.kana, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn customer(name: &str, kana: &str) -> Customer {
        Customer {
            id: name.to_string(),
            name: name.to_string(),
            kana: kana.to_string(),
            gender: Gender::Other,
            birthday: None,
            email: None,
            phone: None,
            address: None,
            medical: None,
            taboo: None,
            height: None,
            memo: None,
            first_posture_group_id: None,
            is_active: true,
            created_at: None,
        }
    }

    #[test]
    fn test_search_matches_name_and_kana() {
        let list = vec![
            customer("山田太郎", "ヤマダタロウ"),
            customer("佐藤花子", "サトウハナコ"),
            customer("Smith", "スミス"),
        ];
        assert_eq!(search(&list, "山田").len(), 1);
        assert_eq!(search(&list, "サトウ").len(), 1);
        assert_eq!(search(&list, "smith").len(), 1);
        assert_eq!(search(&list, "鈴木").len(), 0);
    }

    #[test]
    fn test_search_empty_query_returns_all() {
        let list = vec![customer("A", "a"), customer("B", "b")];
        assert_eq!(search(&list, "").len(), 2);
        assert_eq!(search(&list, "   ").len(), 2);
    }
}
