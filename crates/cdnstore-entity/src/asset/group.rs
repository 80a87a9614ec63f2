//! Upload group aggregate.

use serde::{Deserialize, Serialize};

use cdnstore_core::AppError;

use super::model::Asset;

/// Every asset sharing one group code.
///
/// Groups are not stored; they are assembled from rows on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetGroup {
    /// The shared group code.
    pub code: String,
    /// Member rows, original first when present.
    pub assets: Vec<Asset>,
}

impl AssetGroup {
    /// Assemble a group without checking its shape.
    pub fn new(code: impl Into<String>, mut assets: Vec<Asset>) -> Self {
        assets.sort_by_key(|a| !a.is_original());
        Self {
            code: code.into(),
            assets,
        }
    }

    /// Assemble a freshly written group, requiring exactly one original and
    /// every member to carry the group code.
    pub fn verified(code: impl Into<String>, assets: Vec<Asset>) -> Result<Self, AppError> {
        let group = Self::new(code, assets);

        if let Some(stray) = group.assets.iter().find(|a| a.group_code != group.code) {
            return Err(AppError::batch_integrity(format!(
                "Asset {} carries group code '{}' inside group '{}'",
                stray.id, stray.group_code, group.code
            )));
        }

        let originals = group.assets.iter().filter(|a| a.is_original()).count();
        if originals != 1 {
            return Err(AppError::batch_integrity(format!(
                "Group '{}' has {originals} originals, expected exactly 1",
                group.code
            )));
        }

        Ok(group)
    }

    /// The original upload, if present in this view of the group.
    pub fn original(&self) -> Option<&Asset> {
        self.assets.iter().find(|a| a.is_original())
    }

    /// The derived variants.
    pub fn variants(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(|a| !a.is_original())
    }

    /// Number of member rows.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the group has no member rows.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::model::fixtures::asset;
    use cdnstore_core::error::ErrorKind;

    #[test]
    fn test_original_sorted_first() {
        let group = AssetGroup::new(
            "G1",
            vec![asset("G1", "small"), asset("G1", "original"), asset("G1", "large")],
        );
        assert!(group.assets[0].is_original());
        assert_eq!(group.variants().count(), 2);
    }

    #[test]
    fn test_verified_requires_one_original() {
        let err = AssetGroup::verified("G1", vec![asset("G1", "small")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BatchIntegrity);

        let err = AssetGroup::verified(
            "G1",
            vec![asset("G1", "original"), asset("G1", "original")],
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BatchIntegrity);

        assert!(AssetGroup::verified("G1", vec![asset("G1", "original")]).is_ok());
    }

    #[test]
    fn test_verified_rejects_foreign_rows() {
        let err = AssetGroup::verified(
            "G1",
            vec![asset("G1", "original"), asset("G2", "small")],
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BatchIntegrity);
    }
}
