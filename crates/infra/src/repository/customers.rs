use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use billdesk_core::{CustomerId, Money};
use billdesk_parties::Customer;

use super::{RepositoryError, RepositoryResult};

#[async_trait::async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn read(&self, id: CustomerId) -> RepositoryResult<Customer>;

    /// Add `delta` to the customer's ledger balance and return the updated customer.
    async fn adjust_balance(&self, id: CustomerId, delta: Money) -> RepositoryResult<Customer>;
}

#[async_trait::async_trait]
impl<S> CustomerRepository for Arc<S>
where
    S: CustomerRepository + ?Sized,
{
    async fn read(&self, id: CustomerId) -> RepositoryResult<Customer> {
        (**self).read(id).await
    }

    async fn adjust_balance(&self, id: CustomerId, delta: Money) -> RepositoryResult<Customer> {
        (**self).adjust_balance(id, delta).await
    }
}

/// In-memory customer ledger for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCustomerRepository {
    inner: RwLock<HashMap<CustomerId, Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: impl IntoIterator<Item = Customer>) -> Self {
        Self {
            inner: RwLock::new(customers.into_iter().map(|c| (c.id_typed(), c)).collect()),
        }
    }

    /// Insert or replace a customer record.
    pub fn upsert(&self, customer: Customer) -> RepositoryResult<()> {
        let mut map = self.inner.write()?;
        map.insert(customer.id_typed(), customer);
        Ok(())
    }

    pub fn list(&self) -> RepositoryResult<Vec<Customer>> {
        let map = self.inner.read()?;
        let mut customers: Vec<Customer> = map.values().cloned().collect();
        customers.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(customers)
    }
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn read(&self, id: CustomerId) -> RepositoryResult<Customer> {
        let map = self.inner.read()?;
        map.get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("customer {id}")))
    }

    async fn adjust_balance(&self, id: CustomerId, delta: Money) -> RepositoryResult<Customer> {
        let mut map = self.inner.write()?;
        let customer = map
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("customer {id}")))?;
        customer.apply_adjustment(delta);
        Ok(customer.clone())
    }
}
