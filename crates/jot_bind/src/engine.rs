use core::any::TypeId;
use std::sync::Arc;

use jot_json::{JsonReader, JsonValue, JsonWriter};

use crate::adapter::{Adapt, ErasedAdapter};
use crate::descriptor::TypeDescriptor;
use crate::error::JotError;
use crate::factory::{AdapterFactory, ExactFactory, ReflectiveFactory, StructuralFactory};
use crate::policy::{Direction, ExclusionStrategy, NamingPolicy, NullPolicy};
use crate::registry::{AdapterRegistry, Bind, BindConfig};

// -----------------------------------------------------------------------------
// Jot

/// The serialization engine: an adapter registry plus document-level
/// settings. Immutable once built, cheap to clone, safe to share across
/// threads.
#[derive(Clone)]
pub struct Jot {
    registry: Arc<AdapterRegistry>,
    lenient: bool,
    serialize_nulls: bool,
    indent: Option<String>,
}

impl Jot {
    /// An engine with every default: strict grammar, identity naming, nulls
    /// omitted, null rejection.
    pub fn new() -> Self {
        JotBuilder::new().build()
    }

    pub fn builder() -> JotBuilder {
        JotBuilder::new()
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Resolves the adapter for `T`, building and caching it on first use.
    pub fn adapter<T: Bind>(&self) -> Result<Arc<dyn Adapt<T>>, JotError> {
        self.registry.resolve::<T>()
    }

    /// Serializes `value` to JSON text.
    pub fn to_json<T: Bind>(&self, value: &T) -> Result<String, JotError> {
        let adapter = self.registry.resolve::<T>()?;
        let mut out = String::new();
        let mut writer = JsonWriter::new(&mut out);
        writer.set_lenient(self.lenient);
        writer.set_serialize_nulls(self.serialize_nulls);
        writer.set_indent(self.indent.as_deref());
        adapter.write(&mut writer, value)?;
        writer.finish()?;
        Ok(out)
    }

    /// Deserializes one complete JSON document into a `T`.
    ///
    /// Trailing whitespace is fine; a second top-level value is not.
    pub fn from_json<T: Bind>(&self, text: &str) -> Result<T, JotError> {
        let adapter = self.registry.resolve::<T>()?;
        let mut reader = self.reader(text);
        let value = adapter.read(&mut reader)?;
        reader.end_document()?;
        Ok(value)
    }

    /// Serializes `value` into the tree model.
    pub fn to_value<T: Bind>(&self, value: &T) -> Result<JsonValue, JotError> {
        let text = self.to_json(value)?;
        let mut reader = self.reader(&text);
        Ok(JsonValue::read(&mut reader)?)
    }

    /// Deserializes a tree into a `T` by replaying its tokens.
    pub fn from_value<T: Bind>(&self, tree: &JsonValue) -> Result<T, JotError> {
        let adapter = self.registry.resolve::<T>()?;
        let mut text = String::new();
        let mut writer = JsonWriter::new(&mut text);
        writer.set_lenient(self.lenient);
        tree.write(&mut writer)?;
        writer.finish()?;
        let mut reader = self.reader(&text);
        let value = adapter.read(&mut reader)?;
        reader.end_document()?;
        Ok(value)
    }

    fn reader<'a>(&self, text: &'a str) -> JsonReader<'a> {
        if self.lenient {
            JsonReader::lenient(text)
        } else {
            JsonReader::new(text)
        }
    }
}

impl Default for Jot {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Jot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Jot")
            .field("lenient", &self.lenient)
            .field("serialize_nulls", &self.serialize_nulls)
            .field("indent", &self.indent)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// JotBuilder

/// Configures and builds a [`Jot`] engine. Every setting has a default; an
/// unconfigured build equals [`Jot::new`].
pub struct JotBuilder {
    config: BindConfig,
    before: Vec<Arc<dyn AdapterFactory>>,
    after: Vec<Arc<dyn AdapterFactory>>,
    lenient: bool,
    serialize_nulls: bool,
    indent: Option<String>,
}

impl JotBuilder {
    pub fn new() -> Self {
        Self {
            config: BindConfig::default(),
            before: Vec::new(),
            after: Vec::new(),
            lenient: false,
            serialize_nulls: false,
            indent: None,
        }
    }

    /// Naming policy for members without an explicit rename.
    pub fn naming_policy(mut self, policy: NamingPolicy) -> Self {
        self.config.naming = policy;
        self
    }

    /// Adds an exclusion strategy to both directions.
    pub fn exclude(mut self, strategy: impl ExclusionStrategy + 'static) -> Self {
        let strategy: Arc<dyn ExclusionStrategy> = Arc::new(strategy);
        self.config.serialize_exclusions.push(strategy.clone());
        self.config.deserialize_exclusions.push(strategy);
        self
    }

    /// Adds an exclusion strategy to one direction only.
    pub fn exclude_only(
        mut self,
        direction: Direction,
        strategy: impl ExclusionStrategy + 'static,
    ) -> Self {
        let strategy: Arc<dyn ExclusionStrategy> = Arc::new(strategy);
        match direction {
            Direction::Serialize => self.config.serialize_exclusions.push(strategy),
            Direction::Deserialize => self.config.deserialize_exclusions.push(strategy),
        }
        self
    }

    /// Activates `#[jot(since = ..)]` / `#[jot(until = ..)]` intervals.
    pub fn version(mut self, version: f64) -> Self {
        self.config.version = Some(version);
        self
    }

    /// Policy for JSON null arriving at a member that cannot hold it.
    pub fn null_policy(mut self, policy: NullPolicy) -> Self {
        self.config.null_policy = policy;
        self
    }

    /// Whether object members with null values are written at all.
    pub fn serialize_nulls(mut self, serialize_nulls: bool) -> Self {
        self.serialize_nulls = serialize_nulls;
        self
    }

    /// Lenient grammar for both reading and writing.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Two-space pretty printing.
    pub fn pretty(self) -> Self {
        self.indent("  ")
    }

    /// Pretty printing with an explicit indent unit.
    pub fn indent(mut self, unit: &str) -> Self {
        self.indent = Some(unit.to_string());
        self
    }

    /// Registers a constructor consulted before a type's declared
    /// `Default`.
    pub fn register_constructor<T: 'static>(
        mut self,
        f: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        self.config.constructors.insert(f);
        self
    }

    /// Pins a hand-written adapter for `T`, shadowing whatever the factory
    /// chain would build.
    pub fn register_adapter<T: Bind>(mut self, adapter: impl Adapt<T>) -> Self {
        let erased = ErasedAdapter::new::<T>(Arc::new(adapter));
        self.before.push(Arc::new(PinnedAdapterFactory { id: TypeId::of::<T>(), adapter: erased }));
        self
    }

    /// Adds a factory consulted before the built-in chain.
    pub fn register_factory_before(mut self, factory: impl AdapterFactory + 'static) -> Self {
        self.before.push(Arc::new(factory));
        self
    }

    /// Adds a factory consulted after the built-in chain.
    pub fn register_factory_after(mut self, factory: impl AdapterFactory + 'static) -> Self {
        self.after.push(Arc::new(factory));
        self
    }

    pub fn build(self) -> Jot {
        let mut factories = self.before;
        factories.push(Arc::new(ExactFactory));
        factories.push(Arc::new(StructuralFactory));
        factories.push(Arc::new(ReflectiveFactory));
        factories.extend(self.after);
        Jot {
            registry: Arc::new(AdapterRegistry::new(factories, self.config)),
            lenient: self.lenient,
            serialize_nulls: self.serialize_nulls,
            indent: self.indent,
        }
    }

    /// Builds the engine and applies every `#[jot(auto_register)]`
    /// submission, so bind errors surface now rather than on first use.
    #[cfg(feature = "auto_register")]
    pub fn build_registered(self) -> Result<Jot, JotError> {
        let jot = self.build();
        for plugin in inventory::iter::<crate::plugin::BindPlugin> {
            plugin.apply(jot.registry())?;
        }
        Ok(jot)
    }
}

impl Default for JotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory wrapper for [`JotBuilder::register_adapter`].
struct PinnedAdapterFactory {
    id: TypeId,
    adapter: ErasedAdapter,
}

impl AdapterFactory for PinnedAdapterFactory {
    fn create(
        &self,
        _registry: &AdapterRegistry,
        descriptor: &'static TypeDescriptor,
    ) -> Option<Result<ErasedAdapter, JotError>> {
        (descriptor.id() == self.id).then(|| Ok(self.adapter.clone()))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::derive::Bind;
    use crate::error::{BindError, ConstructError, ResolveError};
    use crate::policy::FieldView;

    #[derive(Bind, Default, Debug, PartialEq)]
    #[jot(default)]
    struct TwoInts {
        #[jot(rename = "A")]
        a: i64,
        #[jot(rename = "B")]
        b: i64,
    }

    #[test]
    fn flat_object_round_trip() {
        let jot = Jot::new();
        let text = r#"{"A":1,"B":2}"#;
        let value: TwoInts = jot.from_json(text).unwrap();
        assert_eq!(value, TwoInts { a: 1, b: 2 });
        assert_eq!(jot.to_json(&value).unwrap(), text);
    }

    #[test]
    fn declared_order_is_preserved_on_write() {
        let jot = Jot::new();
        let text = jot.to_json(&TwoInts { a: 9, b: 8 }).unwrap();
        assert_eq!(text, r#"{"A":9,"B":8}"#);
    }

    #[test]
    fn unknown_members_are_skipped() {
        let jot = Jot::new();
        let text = r#"{"A":1,"junk":{"deep":[1,2,{"x":null}]},"B":2}"#;
        let value: TwoInts = jot.from_json(text).unwrap();
        assert_eq!(value, TwoInts { a: 1, b: 2 });
    }

    // ------------------------------------------------------------------------
    // Recursion and caching

    #[derive(Bind, Default, Debug, PartialEq)]
    #[jot(default)]
    struct Node {
        tag: i64,
        children: Vec<Node>,
    }

    #[test]
    fn self_referential_type_resolves_and_round_trips() {
        let jot = Jot::new();
        let tree = Node {
            tag: 1,
            children: vec![Node {
                tag: 2,
                children: vec![Node { tag: 3, children: vec![] }],
            }],
        };
        let text = jot.to_json(&tree).unwrap();
        assert_eq!(text, r#"{"tag":1,"children":[{"tag":2,"children":[{"tag":3,"children":[]}]}]}"#);
        let back: Node = jot.from_json(&text).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn repeated_resolution_returns_the_same_adapter() {
        let jot = Jot::new();
        let first = jot.adapter::<Node>().unwrap();
        let second = jot.adapter::<Node>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn resolution_is_shared_across_threads() {
        let jot = Jot::new();
        let here = jot.adapter::<Node>().unwrap();
        let engine = jot.clone();
        let there = std::thread::spawn(move || engine.adapter::<Node>().unwrap())
            .join()
            .unwrap();
        assert!(Arc::ptr_eq(&here, &there));
    }

    #[test]
    fn concurrent_first_resolution_yields_one_adapter() {
        let jot = Jot::new();
        let barrier = Arc::new(std::sync::Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = jot.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    engine.adapter::<Node>().unwrap()
                })
            })
            .collect();
        let adapters: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for adapter in &adapters[1..] {
            assert!(Arc::ptr_eq(&adapters[0], adapter));
        }
    }

    // ------------------------------------------------------------------------
    // Nulls

    #[derive(Bind, Default, Debug, PartialEq)]
    #[jot(default)]
    struct WithOption {
        #[jot(rename = "A")]
        a: Option<i64>,
    }

    #[test]
    fn nulls_omitted_by_default() {
        let jot = Jot::new();
        assert_eq!(jot.to_json(&WithOption { a: None }).unwrap(), "{}");
    }

    #[test]
    fn serialize_nulls_keeps_null_members() {
        let jot = Jot::builder().serialize_nulls(true).build();
        assert_eq!(jot.to_json(&WithOption { a: None }).unwrap(), r#"{"A":null}"#);
        assert_eq!(jot.to_json(&WithOption { a: Some(3) }).unwrap(), r#"{"A":3}"#);
    }

    #[test]
    fn option_reads_null_and_value() {
        let jot = Jot::new();
        assert_eq!(jot.from_json::<WithOption>(r#"{"A":null}"#).unwrap(), WithOption { a: None });
        assert_eq!(
            jot.from_json::<WithOption>(r#"{"A":7}"#).unwrap(),
            WithOption { a: Some(7) },
        );
    }

    #[test]
    fn null_for_plain_member_is_rejected_by_default() {
        let jot = Jot::new();
        let err = jot.from_json::<TwoInts>(r#"{"A":null,"B":2}"#).unwrap_err();
        assert!(matches!(err, JotError::NullValue { member, .. } if member == "A"));
    }

    #[test]
    fn null_policy_default_value_keeps_the_constructed_member() {
        let jot = Jot::builder().null_policy(NullPolicy::DefaultValue).build();
        let value: TwoInts = jot.from_json(r#"{"A":null,"B":2}"#).unwrap();
        assert_eq!(value, TwoInts { a: 0, b: 2 });
    }

    #[test]
    fn tree_members_hold_null_as_their_null_variant() {
        #[derive(Bind, Debug, PartialEq)]
        struct Holder {
            v: JsonValue,
            boxed: Box<JsonValue>,
        }

        let jot = Jot::builder()
            .register_constructor(|| Holder {
                v: JsonValue::Null,
                boxed: Box::new(JsonValue::Null),
            })
            .build();
        let value: Holder = jot.from_json(r#"{"v":null,"boxed":null}"#).unwrap();
        assert_eq!(value.v, JsonValue::Null);
        assert_eq!(*value.boxed, JsonValue::Null);

        let value: Holder = jot.from_json(r#"{"v":{"a":1},"boxed":2}"#).unwrap();
        assert!(value.v.as_object().is_some());
    }

    // ------------------------------------------------------------------------
    // Naming

    #[derive(Bind, Default, Debug, PartialEq)]
    #[jot(default)]
    struct Named {
        user_name: String,
        #[jot(rename = "explicit")]
        other_name: i64,
    }

    #[test]
    fn naming_policy_applies_where_rename_does_not() {
        let jot = Jot::builder().naming_policy(NamingPolicy::UpperCamelCase).build();
        let text = jot.to_json(&Named { user_name: "ada".into(), other_name: 1 }).unwrap();
        assert_eq!(text, r#"{"UserName":"ada","explicit":1}"#);
        let back: Named = jot.from_json(&text).unwrap();
        assert_eq!(back.user_name, "ada");
        assert_eq!(back.other_name, 1);
    }

    #[derive(Bind, Default, Debug, PartialEq)]
    #[jot(default)]
    struct Colliding {
        #[jot(rename = "x")]
        a: i64,
        #[jot(rename = "x")]
        b: i64,
    }

    #[test]
    fn colliding_serialized_names_fail_at_bind_time() {
        let jot = Jot::new();
        let err = jot.adapter::<Colliding>().err().unwrap();
        assert!(matches!(
            err,
            JotError::Bind(BindError::DuplicateName { name, .. }) if name == "x",
        ));
    }

    // ------------------------------------------------------------------------
    // Exclusion

    #[derive(Bind, Default, Debug, PartialEq)]
    #[jot(default)]
    struct Partial {
        kept: i64,
        #[jot(skip)]
        hidden: i64,
        #[jot(skip_serializing)]
        read_only: i64,
        #[jot(skip_deserializing)]
        write_only: i64,
    }

    #[test]
    fn skip_attributes_are_per_direction() {
        let jot = Jot::new();
        let value = Partial { kept: 1, hidden: 2, read_only: 3, write_only: 4 };
        let text = jot.to_json(&value).unwrap();
        assert_eq!(text, r#"{"kept":1,"write_only":4}"#);

        let back: Partial =
            jot.from_json(r#"{"kept":9,"hidden":9,"read_only":9,"write_only":9}"#).unwrap();
        // skipped members keep their constructed defaults
        assert_eq!(back, Partial { kept: 9, hidden: 0, read_only: 9, write_only: 0 });
    }

    struct SkipByName(&'static str);

    impl ExclusionStrategy for SkipByName {
        fn skip_field(&self, field: &FieldView<'_>) -> bool {
            field.declared_name == self.0
        }
    }

    #[test]
    fn exclusion_strategy_applies_to_one_direction() {
        let jot = Jot::builder()
            .exclude_only(Direction::Deserialize, SkipByName("a"))
            .build();
        // still serialized
        let text = jot.to_json(&TwoInts { a: 1, b: 2 }).unwrap();
        assert_eq!(text, r#"{"A":1,"B":2}"#);
        // ignored on input, constructed default survives
        let back: TwoInts = jot.from_json(r#"{"A":5,"B":6}"#).unwrap();
        assert_eq!(back, TwoInts { a: 0, b: 6 });
    }

    // ------------------------------------------------------------------------
    // Versioning

    #[derive(Bind, Default, Debug, PartialEq)]
    #[jot(default)]
    struct Versioned {
        always: i64,
        #[jot(since = 2.0)]
        newer: i64,
        #[jot(until = 2.0)]
        retired: i64,
    }

    #[test]
    fn version_interval_excludes_members() {
        let value = Versioned { always: 1, newer: 2, retired: 3 };

        let v1 = Jot::builder().version(1.0).build();
        assert_eq!(v1.to_json(&value).unwrap(), r#"{"always":1,"retired":3}"#);

        let v2 = Jot::builder().version(2.0).build();
        assert_eq!(v2.to_json(&value).unwrap(), r#"{"always":1,"newer":2}"#);

        let unversioned = Jot::new();
        assert_eq!(
            unversioned.to_json(&value).unwrap(),
            r#"{"always":1,"newer":2,"retired":3}"#,
        );
    }

    // ------------------------------------------------------------------------
    // Construction

    #[derive(Bind, Debug, PartialEq)]
    struct NoDefault {
        n: i64,
    }

    #[test]
    fn missing_constructor_reports_a_hint() {
        let jot = Jot::new();
        let err = jot.from_json::<NoDefault>(r#"{"n":1}"#).unwrap_err();
        assert!(matches!(err, JotError::Construct(ConstructError::NoConstructor { .. })));
        // serialization does not need a constructor
        assert_eq!(jot.to_json(&NoDefault { n: 1 }).unwrap(), r#"{"n":1}"#);
    }

    #[test]
    fn registered_constructor_enables_reading() {
        let jot = Jot::builder().register_constructor(|| NoDefault { n: -1 }).build();
        let value: NoDefault = jot.from_json(r#"{"n":41}"#).unwrap();
        assert_eq!(value, NoDefault { n: 41 });
    }

    #[test]
    fn registered_constructor_beats_declared_default() {
        let jot = Jot::builder()
            .register_constructor(|| TwoInts { a: 100, b: 100 })
            .build();
        let value: TwoInts = jot.from_json(r#"{"A":1}"#).unwrap();
        assert_eq!(value, TwoInts { a: 1, b: 100 });
    }

    // ------------------------------------------------------------------------
    // Enums

    #[derive(Bind, Debug, PartialEq, Clone, Copy)]
    enum Color {
        Red,
        #[jot(rename = "emerald")]
        Green,
        Blue,
    }

    #[test]
    fn fieldless_enum_round_trips_as_variant_names() {
        let jot = Jot::new();
        assert_eq!(jot.to_json(&Color::Red).unwrap(), r#""Red""#);
        assert_eq!(jot.to_json(&Color::Green).unwrap(), r#""emerald""#);
        assert_eq!(jot.from_json::<Color>(r#""Blue""#).unwrap(), Color::Blue);
        assert_eq!(jot.from_json::<Color>(r#""emerald""#).unwrap(), Color::Green);
    }

    #[test]
    fn unknown_variant_is_an_error() {
        let jot = Jot::new();
        let err = jot.from_json::<Color>(r#""mauve""#).unwrap_err();
        assert!(matches!(
            err,
            JotError::Bind(BindError::UnknownVariant { name, .. }) if name == "mauve",
        ));
    }

    // ------------------------------------------------------------------------
    // Trees

    #[test]
    fn tree_entry_points_round_trip() {
        let jot = Jot::new();
        let value = TwoInts { a: 1, b: 2 };
        let tree = jot.to_value(&value).unwrap();
        assert_eq!(
            tree.as_object().unwrap().get("A").unwrap().as_number().unwrap().as_i64(),
            Some(1),
        );
        let back: TwoInts = jot.from_value(&tree).unwrap();
        assert_eq!(back, value);
    }

    // ------------------------------------------------------------------------
    // Containers and generics

    #[derive(Bind, Default, Debug, PartialEq)]
    #[jot(default)]
    struct Wrapper<T: Default> {
        item: T,
        rest: Vec<T>,
    }

    #[test]
    fn generic_struct_binds_per_instantiation() {
        let jot = Jot::new();
        let words = Wrapper { item: "a".to_string(), rest: vec!["b".to_string()] };
        let text = jot.to_json(&words).unwrap();
        assert_eq!(text, r#"{"item":"a","rest":["b"]}"#);
        assert_eq!(jot.from_json::<Wrapper<String>>(&text).unwrap(), words);

        let numbers = Wrapper { item: 1_i64, rest: vec![2, 3] };
        let text = jot.to_json(&numbers).unwrap();
        assert_eq!(jot.from_json::<Wrapper<i64>>(&text).unwrap(), numbers);
    }

    #[test]
    fn maps_and_arrays_round_trip() {
        let jot = Jot::new();
        let mut map: HashMap<String, [u8; 2]> = HashMap::new();
        map.insert("k".to_string(), [1, 2]);
        let text = jot.to_json(&map).unwrap();
        assert_eq!(text, r#"{"k":[1,2]}"#);
        assert_eq!(jot.from_json::<HashMap<String, [u8; 2]>>(&text).unwrap(), map);

        let err = jot.from_json::<[u8; 2]>("[1,2,3]").unwrap_err();
        assert!(matches!(err, JotError::Invalid { .. }));
    }

    // ------------------------------------------------------------------------
    // Custom adapters and factories

    struct UppercaseStrings;

    impl Adapt<String> for UppercaseStrings {
        fn read(&self, reader: &mut JsonReader<'_>) -> Result<String, JotError> {
            Ok(reader.next_string()?)
        }

        fn write(&self, writer: &mut JsonWriter<'_>, value: &String) -> Result<(), JotError> {
            writer.string_value(&value.to_uppercase())?;
            Ok(())
        }
    }

    #[test]
    fn registered_adapter_shadows_the_builtin() {
        let jot = Jot::builder().register_adapter::<String>(UppercaseStrings).build();
        assert_eq!(jot.to_json(&"loud".to_string()).unwrap(), r#""LOUD""#);
        // composes through containers too
        assert_eq!(jot.to_json(&vec!["a".to_string()]).unwrap(), r#"["A"]"#);
    }

    struct DecliningFactory;

    impl AdapterFactory for DecliningFactory {
        fn create(
            &self,
            _registry: &AdapterRegistry,
            _descriptor: &'static TypeDescriptor,
        ) -> Option<Result<ErasedAdapter, JotError>> {
            None
        }
    }

    #[test]
    fn declining_factories_fall_through_to_the_chain() {
        let jot = Jot::builder()
            .register_factory_before(DecliningFactory)
            .register_factory_after(DecliningFactory)
            .build();
        assert_eq!(jot.to_json(&1_i64).unwrap(), "1");
    }

    #[test]
    fn construction_failure_repeats_on_every_read() {
        let jot = Jot::new();
        assert!(matches!(
            jot.from_json::<NoDefault>("{}").unwrap_err(),
            JotError::Construct(_),
        ));
        assert!(jot.from_json::<NoDefault>("{}").is_err());
    }

    // ------------------------------------------------------------------------
    // Document-Level settings

    #[test]
    fn lenient_engine_reads_informal_documents() {
        let jot = Jot::builder().lenient(true).build();
        let value: TwoInts = jot.from_json("{A: 1, B: 2,}").unwrap();
        assert_eq!(value, TwoInts { a: 1, b: 2 });
    }

    #[test]
    fn strict_engine_rejects_informal_documents() {
        let jot = Jot::new();
        assert!(matches!(
            jot.from_json::<TwoInts>("{A: 1, B: 2}").unwrap_err(),
            JotError::Json(_),
        ));
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let jot = Jot::new();
        assert!(matches!(
            jot.from_json::<i64>("1 2").unwrap_err(),
            JotError::Json(_),
        ));
        assert_eq!(jot.from_json::<i64>("1  \n").unwrap(), 1);
    }

    #[test]
    fn pretty_printing_via_the_builder() {
        let jot = Jot::builder().pretty().build();
        let text = jot.to_json(&TwoInts { a: 1, b: 2 }).unwrap();
        assert_eq!(text, "{\n  \"A\": 1,\n  \"B\": 2\n}");
    }

    #[test]
    fn factory_errors_surface_through_resolve() {
        struct RefusingFactory;
        impl AdapterFactory for RefusingFactory {
            fn create(
                &self,
                _registry: &AdapterRegistry,
                descriptor: &'static TypeDescriptor,
            ) -> Option<Result<ErasedAdapter, JotError>> {
                (descriptor.id() == TypeId::of::<Node>())
                    .then(|| Err(ResolveError::NoFactory { path: descriptor.path() }.into()))
            }
        }
        let jot = Jot::builder().register_factory_before(RefusingFactory).build();
        let err = jot.adapter::<Node>().err().unwrap();
        assert!(matches!(err, JotError::Resolve(ResolveError::NoFactory { .. })));
    }

    // ------------------------------------------------------------------------
    // PhantomData

    #[derive(Bind, Default, Debug, PartialEq)]
    #[jot(default)]
    struct Tagged {
        n: i64,
        marker: core::marker::PhantomData<u32>,
    }

    #[test]
    fn phantom_members_never_appear() {
        let jot = Jot::new();
        let text = jot.to_json(&Tagged { n: 1, marker: core::marker::PhantomData }).unwrap();
        assert_eq!(text, r#"{"n":1}"#);
        let back: Tagged = jot.from_json(r#"{"n":1,"marker":"ignored"}"#).unwrap();
        assert_eq!(back.n, 1);
    }
}

#[cfg(all(test, feature = "auto_register"))]
mod auto_register_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::derive::Bind;

    #[derive(Bind, Default, Debug, PartialEq)]
    #[jot(default, auto_register)]
    struct Registered {
        n: i64,
    }

    struct CountingFactory(Arc<AtomicUsize>);

    impl AdapterFactory for CountingFactory {
        fn create(
            &self,
            _registry: &AdapterRegistry,
            descriptor: &'static TypeDescriptor,
        ) -> Option<Result<ErasedAdapter, JotError>> {
            if descriptor.id() == TypeId::of::<Registered>() {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            None
        }
    }

    #[test]
    fn build_registered_warms_submitted_types() {
        let consulted = Arc::new(AtomicUsize::new(0));
        let jot = Jot::builder()
            .register_factory_before(CountingFactory(consulted.clone()))
            .build_registered()
            .unwrap();
        // the submitted type went through the chain while building
        assert_eq!(consulted.load(Ordering::SeqCst), 1);
        // first use hits the warmed cache instead of the chain
        let value: Registered = jot.from_json(r#"{"n":5}"#).unwrap();
        assert_eq!(value, Registered { n: 5 });
        assert_eq!(consulted.load(Ordering::SeqCst), 1);
    }
}
