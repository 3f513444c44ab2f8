mod avatar_service_port;
mod blob_store_port;
mod icon_generator_port;
mod icon_provider_port;
mod transient_store_port;

pub use avatar_service_port::{AvatarServicePort, ProbeResponse};
pub use blob_store_port::{BlobEntry, BlobStorePort};
pub use icon_generator_port::{IconGenerator, MAX_ICON_SIZE, check_icon_size};
pub use icon_provider_port::IconProvider;
pub use transient_store_port::{
    KEY_PREFIX, StoreScope, TransientStorePort, prefixed, strip_prefix,
};
