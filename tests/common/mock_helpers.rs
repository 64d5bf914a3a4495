//! Mock construction helpers

use mockall::mock;
use std::sync::Arc;
use trace_topology::error::Result;
use trace_topology::facade::{EventHooks, EventHost, PmuDescriptor};

mock! {
    pub Host {}

    impl EventHost for Host {
        fn register(&mut self, descriptor: &PmuDescriptor, hooks: Arc<dyn EventHooks>) -> Result<()>;
    }
}

/// Host mock that accepts exactly one registration under `name`
pub fn expect_single_registration(name: &'static str) -> MockHost {
    let mut host = MockHost::new();
    host.expect_register()
        .withf(move |descriptor, _| descriptor.name == name)
        .times(1)
        .returning(|_, _| Ok(()));
    host
}
