//! Background Tasks Module
//!
//! Contains background tasks owned by a [`Cache`](crate::Cache).
//!
//! # Tasks
//! - Maintenance: removes expired cache entries at the configured interval

mod maintenance;

pub(crate) use maintenance::spawn_maintenance_task;
