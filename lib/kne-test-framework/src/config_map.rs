//! Rewrites of the operator's versions ConfigMap.
//!
//! The ConfigMap carries a JSON document under `data.versions` listing the
//! component images the operator deploys. The negative and customization
//! scenarios all work by rewriting pieces of that document and re-applying
//! the map before a topology is created.

use serde_json::{json, Value};

use super::Result;

/// Tag assigned to a component to make its image unpullable.
pub const BAD_TAG: &str = "DUMMY";

fn parse(document: &str) -> Result<(serde_yaml::Value, Value)> {
    let root: serde_yaml::Value = serde_yaml::from_str(document)?;
    let versions = root
        .get("data")
        .and_then(|data| data.get("versions"))
        .and_then(serde_yaml::Value::as_str)
        .ok_or("config map without data.versions")?;
    let versions: Value = serde_json::from_str(versions)?;
    Ok((root, versions))
}

fn render(mut root: serde_yaml::Value, versions: &Value) -> Result<String> {
    let slot = root
        .get_mut("data")
        .and_then(|data| data.get_mut("versions"))
        .ok_or("config map without data.versions")?;
    *slot = serde_yaml::Value::String(serde_json::to_string(versions)?);
    Ok(serde_yaml::to_string(&root)?)
}

fn images(versions: &mut Value) -> Result<&mut Vec<Value>> {
    versions
        .get_mut("images")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| "config map versions without images".into())
}

fn image_mut<'a>(images: &'a mut [Value], component: &str) -> Option<&'a mut Value> {
    images
        .iter_mut()
        .find(|image| image["name"] == component)
}

/// Give one component an unpullable image tag. With `update_release` the
/// document's release is pinned to the controller tag first, so the operator
/// resolves versions against a release it cannot satisfy.
pub fn with_bad_component(document: &str, component: &str, update_release: bool) -> Result<String> {
    let (root, mut versions) = parse(document)?;
    if update_release {
        let controller_tag = images(&mut versions)?
            .iter()
            .find(|image| image["name"] == "controller")
            .and_then(|image| image["tag"].as_str())
            .ok_or("config map versions without a controller image")?
            .to_owned();
        versions["release"] = Value::String(controller_tag);
    }
    let images = images(&mut versions)?;
    let image = image_mut(images, component)
        .ok_or_else(|| format!("component {component} not found in config map"))?;
    image["tag"] = Value::String(BAD_TAG.to_owned());
    render(root, &versions)
}

/// Append the `init-wait` init container image.
pub fn with_init_container(document: &str) -> Result<String> {
    let (root, mut versions) = parse(document)?;
    images(&mut versions)?.push(json!({
        "name": "init-wait",
        "path": "networkop/init-wait",
        "tag": "latest",
    }));
    render(root, &versions)
}

/// Extra keys to set on one component's image entry, such as `args`,
/// `command`, `env`, probe parameters or `min-resource`.
#[derive(Debug)]
pub struct ImageOverride<'a> {
    pub component: &'a str,
    pub keys: Vec<(&'a str, Value)>,
}

/// Apply per-component key overrides to the image entries.
pub fn with_image_overrides(document: &str, overrides: &[ImageOverride<'_>]) -> Result<String> {
    let (root, mut versions) = parse(document)?;
    let images = images(&mut versions)?;
    for image_override in overrides {
        let image = image_mut(images, image_override.component).ok_or_else(|| {
            format!(
                "component {} not found in config map",
                image_override.component
            )
        })?;
        for (key, value) in &image_override.keys {
            image[*key] = value.clone();
        }
    }
    render(root, &versions)
}

/// Point the controller at a license server address and optionally append a
/// license-server image entry.
pub fn with_license_server(
    document: &str,
    address: Option<&str>,
    image: Option<(&str, &str)>,
) -> Result<String> {
    let (root, mut versions) = parse(document)?;
    if let Some(address) = address {
        let images = images(&mut versions)?;
        let controller = image_mut(images, "controller")
            .ok_or("config map versions without a controller image")?;
        controller["env"] = json!({ "LICENSE_SERVERS": address });
    }
    if let Some((path, tag)) = image {
        images(&mut versions)?.push(json!({
            "name": "license-server",
            "path": path,
            "tag": tag,
        }));
    }
    render(root, &versions)
}
