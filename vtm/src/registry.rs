//! Registration table of every vtm resource and data source

use tfplug::Registry;

use crate::data_sources::{
    ConfigDataSource, InformationDataSource, ListDataSource, StatsDataSource,
};
use crate::objects::KINDS;
use crate::resources::ConfigResource;

/// Build the table once and pass it to `ProviderServer::new` by reference
pub fn registry() -> tfplug::Result<Registry> {
    let mut registry = Registry::new();

    for kind in KINDS {
        registry.register_resource(&kind.resource_type_name(), move || {
            Box::new(ConfigResource::new(kind))
        })?;
        registry.register_data_source(&kind.resource_type_name(), move || {
            Box::new(ConfigDataSource::new(kind))
        })?;
        registry.register_data_source(&kind.list_type_name(), move || {
            Box::new(ListDataSource::new(kind))
        })?;
        if let Some(statistics) = &kind.statistics {
            registry.register_data_source(&kind.stats_type_name(), move || {
                Box::new(StatsDataSource::new(kind, statistics))
            })?;
        }
    }

    registry.register_data_source(InformationDataSource::TYPE_NAME, || {
        Box::new(InformationDataSource::new())
    })?;

    tracing::debug!(
        "Registered {} resources and {} data sources",
        registry.resource_names().count(),
        registry.data_source_names().count()
    );
    Ok(registry)
}
