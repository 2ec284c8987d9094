// Implements `Resource` for a top-level object declared with `wire_object!`.
//
// The object must have a `metadata: ObjectMeta` slot.
macro_rules! resource {
    (
        $ty:ident,
        api_version = $api_version:literal,
        group = $group:literal,
        version = $version:literal,
        kind = $kind:literal,
        plural = $plural:literal,
        scope = $scope:ty $(,)?
    ) => {
        impl $crate::Resource for $ty {
            const API_VERSION: &'static str = $api_version;
            const GROUP: &'static str = $group;
            const KIND: &'static str = $kind;
            const VERSION: &'static str = $version;
            const URL_PATH_SEGMENT: &'static str = $plural;
            type Scope = $scope;

            fn meta(&self) -> Option<&$crate::apimachinery::meta::v1::ObjectMeta> {
                self.metadata.as_ref()
            }

            fn meta_mut(&mut self) -> &mut $crate::apimachinery::meta::v1::ObjectMeta {
                self.metadata.get_or_insert_with(Default::default)
            }

            fn type_meta_mut(&mut self) -> (&mut Option<String>, &mut Option<String>) {
                (&mut self.api_version, &mut self.kind)
            }
        }
    };
}
