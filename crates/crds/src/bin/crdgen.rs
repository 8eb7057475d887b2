//! Prints the HardwareClassification CRD manifest.
//!
//! `cargo run -p crds --bin crdgen > config/crd/hardwareclassification.yaml`

use anyhow::Context;
use crds::HardwareClassification;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let manifest = serde_yaml::to_string(&HardwareClassification::crd())
        .context("serializing HardwareClassification CRD")?;
    print!("{manifest}");
    Ok(())
}
