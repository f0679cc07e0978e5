//! Where each record lives in the PI Web API URL space.
//!
//! # Design
//! A `Resource` names the collection segment its WebIds live under
//! (`elements/{webId}`). `ChildOf<P>` names the segment under a parent that
//! lists or creates children (`elements/{webId}/attributes`). With these
//! two traits one generic façade serves every resource kind.

use crate::schema::PiObject;
use crate::types::{
    PIAssetDatabase, PIAssetServer, PIAttribute, PIAttributeTemplate, PIDataServer, PIElement,
    PIElementTemplate, PIEventFrame, PIPoint,
};

/// A record addressable by WebId and by path.
pub trait Resource: PiObject {
    /// Collection segment, e.g. `elements`.
    const COLLECTION: &'static str;

    fn web_id(&self) -> Option<&str>;
}

/// A resource listed directly under the API root (`assetservers`, `dataservers`).
pub trait RootResource: Resource {}

/// `Self` can be listed and created under a `P`.
pub trait ChildOf<P: Resource>: Resource {
    const SEGMENT: &'static str;
}

macro_rules! resource {
    ($ty:ty, $collection:literal) => {
        impl Resource for $ty {
            const COLLECTION: &'static str = $collection;

            fn web_id(&self) -> Option<&str> {
                self.web_id.as_deref()
            }
        }
    };
}

macro_rules! child_of {
    ($parent:ty => $child:ty, $segment:literal) => {
        impl ChildOf<$parent> for $child {
            const SEGMENT: &'static str = $segment;
        }
    };
}

resource!(PIAssetServer, "assetservers");
resource!(PIAssetDatabase, "assetdatabases");
resource!(PIElement, "elements");
resource!(PIElementTemplate, "elementtemplates");
resource!(PIAttribute, "attributes");
resource!(PIAttributeTemplate, "attributetemplates");
resource!(PIDataServer, "dataservers");
resource!(PIPoint, "points");
resource!(PIEventFrame, "eventframes");

impl RootResource for PIAssetServer {}
impl RootResource for PIDataServer {}

child_of!(PIAssetServer => PIAssetDatabase, "assetdatabases");
child_of!(PIAssetDatabase => PIElement, "elements");
child_of!(PIAssetDatabase => PIElementTemplate, "elementtemplates");
child_of!(PIAssetDatabase => PIEventFrame, "eventframes");
child_of!(PIElement => PIElement, "elements");
child_of!(PIElement => PIAttribute, "attributes");
child_of!(PIElementTemplate => PIAttributeTemplate, "attributetemplates");
child_of!(PIAttribute => PIAttribute, "attributes");
child_of!(PIDataServer => PIPoint, "points");
child_of!(PIEventFrame => PIEventFrame, "eventframes");

#[cfg(test)]
mod tests {
    use super::*;

    fn segment<P: Resource, C: ChildOf<P>>() -> &'static str {
        C::SEGMENT
    }

    #[test]
    fn web_id_reads_the_record_field() {
        let element = PIElement {
            web_id: Some("E1".to_string()),
            ..Default::default()
        };
        assert_eq!(element.web_id(), Some("E1"));
        assert_eq!(PIPoint::default().web_id(), None);
    }

    #[test]
    fn child_segments_depend_on_parent() {
        assert_eq!(segment::<PIAssetDatabase, PIElement>(), "elements");
        assert_eq!(segment::<PIElement, PIAttribute>(), "attributes");
        assert_eq!(segment::<PIAssetServer, PIAssetDatabase>(), "assetdatabases");
        assert_eq!(PIAssetDatabase::COLLECTION, "assetdatabases");
    }
}
