//! Catalog documents written to disk and loaded by the memory backend.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};

/// Ids of the landsat scenes on WRS path 10.
pub const PATH_10_SCENES: [&str; 3] = [
    "LC80100102015050LGN00",
    "LC80100102015082LGN00",
    "LC80100122015050LGN00",
];

fn scene(
    id: &str,
    collection: &str,
    datetime: &str,
    [w, s, e, n]: [f64; 4],
    properties: Value,
) -> Value {
    let mut properties = properties;
    properties["datetime"] = json!(datetime);
    json!({
        "type": "Feature",
        "stac_version": "1.0.0",
        "id": id,
        "collection": collection,
        "bbox": [w, s, e, n],
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[w, s], [e, s], [e, n], [w, n], [w, s]]]
        },
        "properties": properties,
        "assets": {},
        "links": []
    })
}

pub fn collections() -> Vec<Value> {
    vec![
        json!({
            "type": "Collection",
            "stac_version": "1.0.0",
            "id": "landsat-8-l1",
            "title": "Landsat 8 L1",
            "description": "Landsat 8 imagery",
            "license": "PDDL-1.0",
            "properties": { "platform": "landsat-8", "eo:epsg": 32614 }
        }),
        json!({
            "type": "Collection",
            "stac_version": "1.0.0",
            "id": "sentinel-2-l1c",
            "title": "Sentinel 2 L1C",
            "description": "Sentinel-2a and Sentinel-2b imagery",
            "license": "proprietary",
            "properties": { "platform": "sentinel-2a" }
        }),
    ]
}

pub fn landsat_scenes() -> Vec<Value> {
    vec![
        scene(
            "LC80100102015050LGN00",
            "landsat-8-l1",
            "2015-02-19T15:06:12Z",
            [-66.5, 71.3, -60.2, 73.9],
            json!({ "landsat:wrs_path": "10", "landsat:wrs_row": "10", "eo:cloud_cover": 8 }),
        ),
        scene(
            "LC80100102015082LGN00",
            "landsat-8-l1",
            "2015-03-23T15:05:56Z",
            [-66.5, 71.3, -60.2, 73.9],
            json!({ "landsat:wrs_path": "10", "landsat:wrs_row": "10", "eo:cloud_cover": 17 }),
        ),
        scene(
            "LC80100122015050LGN00",
            "landsat-8-l1",
            "2015-02-19T15:07:00Z",
            [-70.1, 68.4, -64.0, 71.0],
            json!({ "landsat:wrs_path": "10", "landsat:wrs_row": "12", "eo:cloud_cover": 54 }),
        ),
        scene(
            "LC80200352016112LGN00",
            "landsat-8-l1",
            "2016-04-21T16:45:00Z",
            [-87.9, 34.6, -85.4, 36.8],
            json!({ "landsat:wrs_path": "20", "landsat:wrs_row": "35", "eo:cloud_cover": 2 }),
        ),
    ]
}

pub fn sentinel_scene() -> Value {
    scene(
        "S2A_OPER_MSI_L1C_TL_SGS__20160312_T32TLR",
        "sentinel-2-l1c",
        "2016-03-12T10:30:00Z",
        [6.0, 45.0, 7.4, 46.0],
        json!({ "eo:cloud_cover": 30 }),
    )
}

/// Writes the catalog in the layout `MemoryBackend::from_dir` reads: one
/// file per collection, the landsat scenes as a FeatureCollection and the
/// sentinel scene as a single Feature.
pub fn write_catalog(dir: &Path) -> std::io::Result<()> {
    let collections_dir = dir.join("collections");
    let items_dir = dir.join("items");
    fs::create_dir_all(&collections_dir)?;
    fs::create_dir_all(&items_dir)?;

    for collection in collections() {
        let id = collection["id"].as_str().unwrap_or_default().to_string();
        fs::write(
            collections_dir.join(format!("{}.json", id)),
            collection.to_string(),
        )?;
    }

    let landsat = json!({ "type": "FeatureCollection", "features": landsat_scenes() });
    fs::write(items_dir.join("landsat.json"), landsat.to_string())?;
    fs::write(items_dir.join("sentinel.json"), sentinel_scene().to_string())?;

    Ok(())
}
