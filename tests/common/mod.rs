#![allow(dead_code)]

pub mod fake_store;

use std::sync::Arc;

use shop_journey::browser::session::SessionContext;
use shop_journey::flow::library::ShopFlows;
use shop_journey::flow::tolerance::ToleranceTable;
use shop_journey::model::persona::Persona;
use shop_journey::sync::wait::{TimeoutPolicy, Waiter};

use fake_store::{BASE_URL, FakeStoreFactory};

/// Open a session on `factory` and build the flow library over it.
/// Keep the returned context alive for as long as the flows are used.
pub async fn open_flows(factory: &Arc<FakeStoreFactory>) -> (SessionContext, ShopFlows) {
    let mut ctx = SessionContext::new(factory.clone());
    let session = ctx.acquire().await.unwrap();
    let flows = ShopFlows::new(
        session,
        BASE_URL,
        TimeoutPolicy::default(),
        Arc::new(ToleranceTable::storefront()),
    );
    (ctx, flows)
}

pub async fn logged_in(
    factory: &Arc<FakeStoreFactory>,
    persona: Persona,
) -> (SessionContext, ShopFlows) {
    let (ctx, mut flows) = open_flows(factory).await;
    flows.login_as(persona).await.unwrap();
    (ctx, flows)
}

pub async fn open_waiter(factory: &Arc<FakeStoreFactory>) -> (SessionContext, Waiter) {
    let mut ctx = SessionContext::new(factory.clone());
    let session = ctx.acquire().await.unwrap();
    (ctx, Waiter::new(session, TimeoutPolicy::default()))
}

pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
