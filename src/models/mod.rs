//! Selection-and-sequencing domain models.
//!
//! Provides the immutable instance (items, providers, budget) and the
//! schedule value produced by the builder or decoded from a solver result.
//!
//! # Domain Mappings
//!
//! | u-provision | Digital library | Logistics | Cloud batch |
//! |-------------|-----------------|-----------|-------------|
//! | Item | Book | Parcel | Job |
//! | Provider | Library | Depot | Worker pool |
//! | Activation cost | Signup days | Opening time | Boot time |
//! | Throughput rate | Books per day | Parcels per hour | Jobs per tick |

mod instance;
mod item;
mod provider;
mod schedule;

pub use instance::{Instance, InstanceData, InstanceError, ProviderData};
pub use item::{Item, ItemId};
pub use provider::{Provider, ProviderId};
pub use schedule::{Schedule, ScheduleEntry};
