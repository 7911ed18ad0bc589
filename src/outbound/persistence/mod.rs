//! MySQL persistence adapters.

mod mysql_record_store;
mod mysql_replica_store;
mod pool;
mod support;

pub use mysql_record_store::MySqlRecordStore;
pub use mysql_replica_store::MySqlReplicaStore;
pub use pool::{DbPool, PoolConfig};
