//! Catalog fixtures.
//!
//! Two collections: `landsat-8-l1` with four scenes (three on WRS path 10)
//! and `sentinel-2-l1c` with one. [`tiled_engine`] adds three sentinel tiles
//! acquired at the same instant. Collection properties such as `platform`
//! are only set on the collections and reach the items through the backend.

use std::sync::Arc;

use satapi_search::backends::memory::MemoryBackend;
use satapi_search::{SearchConfig, SearchEngine};
use serde_json::{Value, json};

pub const BASE_URL: &str = "http://localhost:8080";

/// A scene fixture.
#[derive(Debug, Clone)]
pub struct ItemFixture {
    pub id: String,
    pub collection: String,
    pub datetime: String,
    pub bbox: [f64; 4],
    pub properties: Value,
}

impl ItemFixture {
    /// Creates a scene with the given footprint and no extra properties.
    pub fn new(
        id: impl Into<String>,
        collection: impl Into<String>,
        datetime: impl Into<String>,
        bbox: [f64; 4],
    ) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
            datetime: datetime.into(),
            bbox,
            properties: json!({}),
        }
    }

    /// Sets a property.
    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties[name] = value;
        self
    }

    /// Builds the item document.
    pub fn build(&self) -> Value {
        let [w, s, e, n] = self.bbox;
        let mut properties = self.properties.clone();
        properties["datetime"] = json!(self.datetime);
        json!({
            "type": "Feature",
            "stac_version": "1.0.0",
            "id": self.id,
            "collection": self.collection,
            "bbox": self.bbox,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[w, s], [e, s], [e, n], [w, n], [w, s]]]
            },
            "properties": properties,
            "assets": {
                "thumbnail": { "href": format!("https://example.com/{}/thumb.jpg", self.id) }
            },
            "links": []
        })
    }
}

pub fn landsat_collection() -> Value {
    json!({
        "type": "Collection",
        "stac_version": "1.0.0",
        "id": "landsat-8-l1",
        "title": "Landsat 8 L1",
        "description": "Landat 8 imagery radiometrically calibrated and orthorectified.",
        "license": "PDDL-1.0",
        "properties": {
            "platform": "landsat-8",
            "instruments": ["oli", "tirs"],
            "eo:epsg": 32614
        },
        "links": []
    })
}

pub fn sentinel_collection() -> Value {
    json!({
        "type": "Collection",
        "stac_version": "1.0.0",
        "id": "sentinel-2-l1c",
        "title": "Sentinel 2 L1C",
        "description": "Sentinel-2a and Sentinel-2b imagery.",
        "license": "proprietary",
        "properties": { "platform": "sentinel-2a" },
        "links": []
    })
}

pub fn items() -> Vec<ItemFixture> {
    vec![
        ItemFixture::new(
            "LC80100102015050LGN00",
            "landsat-8-l1",
            "2015-02-19T15:06:12Z",
            [-66.5, 71.3, -60.2, 73.9],
        )
        .with_property("landsat:wrs_path", json!("10"))
        .with_property("landsat:wrs_row", json!("10"))
        .with_property("eo:cloud_cover", json!(8)),
        ItemFixture::new(
            "LC80100102015082LGN00",
            "landsat-8-l1",
            "2015-03-23T15:05:56Z",
            [-66.5, 71.3, -60.2, 73.9],
        )
        .with_property("landsat:wrs_path", json!("10"))
        .with_property("landsat:wrs_row", json!("10"))
        .with_property("eo:cloud_cover", json!(17)),
        ItemFixture::new(
            "LC80100122015050LGN00",
            "landsat-8-l1",
            "2015-02-19T15:07:00Z",
            [-70.1, 68.4, -64.0, 71.0],
        )
        .with_property("landsat:wrs_path", json!("10"))
        .with_property("landsat:wrs_row", json!("12"))
        .with_property("eo:cloud_cover", json!(54)),
        ItemFixture::new(
            "LC80200352016112LGN00",
            "landsat-8-l1",
            "2016-04-21T16:45:00Z",
            [-87.9, 34.6, -85.4, 36.8],
        )
        .with_property("landsat:wrs_path", json!("20"))
        .with_property("landsat:wrs_row", json!("35"))
        .with_property("eo:cloud_cover", json!(2)),
        ItemFixture::new(
            "S2A_OPER_MSI_L1C_TL_SGS__20160312_T32TLR",
            "sentinel-2-l1c",
            "2016-03-12T10:30:00Z",
            [6.0, 45.0, 7.4, 46.0],
        )
        .with_property("eo:cloud_cover", json!(30)),
    ]
}

/// Sentinel tiles sharing one acquisition time, out of id order.
pub fn simultaneous_tiles() -> Vec<ItemFixture> {
    ["T32TMR", "T32TLR", "T32TNR"]
        .into_iter()
        .enumerate()
        .map(|(i, tile)| {
            let west = 6.0 + i as f64;
            ItemFixture::new(
                format!("S2B_OPER_MSI_L1C_TL_SGS__20170601_{}", tile),
                "sentinel-2-l1c",
                "2017-06-01T10:20:31Z",
                [west, 45.0, west + 1.0, 46.0],
            )
            .with_property("eo:cloud_cover", json!(12))
        })
        .collect()
}

/// A backend loaded with both collections and every fixture item.
pub fn seeded_backend() -> Arc<MemoryBackend> {
    let backend = MemoryBackend::new();
    backend
        .insert_collection(landsat_collection())
        .expect("insert landsat collection");
    backend
        .insert_collection(sentinel_collection())
        .expect("insert sentinel collection");
    for item in items() {
        backend.insert_item(item.build()).expect("insert item");
    }
    Arc::new(backend)
}

pub fn engine() -> SearchEngine<MemoryBackend> {
    SearchEngine::new(seeded_backend(), SearchConfig::default())
}

/// The seeded catalog plus [`simultaneous_tiles`].
pub fn tiled_engine() -> SearchEngine<MemoryBackend> {
    let backend = seeded_backend();
    for item in simultaneous_tiles() {
        backend.insert_item(item.build()).expect("insert tile");
    }
    SearchEngine::new(backend, SearchConfig::default())
}
