//! End-to-end tests: IDL trees in, registry and conversion plans out.
//!
//! Each test builds a small repository by hand, runs the whole registry
//! build and inspects either the resolved types or the converters selected
//! for the resulting signatures.

use girbind::convert::Borrow;
use girbind::prelude::*;
use girbind::registry::types::{Class, ContainerType, Conversions, Record};

fn demo() -> IdlNamespace {
    IdlNamespace::new("Demo", "1.0").with_prefixes("Demo", "demo")
}

fn gobject() -> IdlNamespace {
    IdlNamespace::new("GObject", "2.0").with_prefixes("G", "g")
}

/// Config with `GObject.Object` supplied by hand, so classes have a root.
fn object_config() -> Config {
    Config::default().with_namespace(
        "GObject-2",
        NamespaceConfig::new().with_manual_type(Type::Class(Class::new("Object", "GObject"))),
    )
}

fn build(ns: IdlNamespace) -> (Registry, BuildReport) {
    build_with(Config::default(), ns)
}

fn build_with(config: Config, ns: IdlNamespace) -> (Registry, BuildReport) {
    RegistryBuilder::new(config)
        .with_repository(IdlRepository::new(ns))
        .build()
        .expect("build failed")
}

fn gint() -> IdlType {
    IdlType::new("gint", "gint")
}

fn user_data(closure: usize) -> IdlParameter {
    IdlParameter::new("user_data", IdlType::new("gpointer", "gpointer")).with_closure(closure)
}

/// A callback taking only its user data.
fn simple_callback(name: &str) -> IdlCallback {
    IdlCallback::new(format!("Demo{name}"), IdlCallable::new(name, "").with_param(user_data(0)))
}

fn signature<'a>(registry: &'a Registry, function: &str) -> &'a Signature {
    &registry
        .namespace("Demo-1")
        .and_then(|ns| ns.function(function))
        .unwrap_or_else(|| panic!("function {function} missing"))
        .signature
}

fn to_native(registry: &Registry, function: &str) -> Vec<Strategy> {
    let sig = signature(registry, function);
    CallableConverters::new(registry, sig, ParameterMode::Callable)
        .params
        .into_iter()
        .map(|c| c.strategy)
        .collect()
}

fn from_native(registry: &Registry, function: &str) -> Vec<Strategy> {
    let sig = signature(registry, function);
    CallableConverters::new(registry, sig, ParameterMode::Callable)
        .returns
        .into_iter()
        .map(|c| c.strategy)
        .collect()
}

fn assert_send_sync<T: Send + Sync>() {}

// =============================================================================
// Aliases
// =============================================================================

#[test]
fn test_alias_of_primitive_resolves() {
    let (registry, report) = build(demo().with_alias(IdlAlias::new("Size", "DemoSize", gint())));

    let Some(Type::Alias(alias)) = registry.lookup("Demo-1", "Size") else {
        panic!("Size should be an alias");
    };
    assert!(matches!(registry.resolve(&alias.target), Some(Type::Primitive(_))));
    assert!(report.find("Size").is_none());
}

#[test]
fn test_alias_of_pointer_type_is_not_resolvable() {
    let (registry, report) = build(demo().with_alias(IdlAlias::new(
        "Name",
        "DemoName",
        IdlType::new("utf8", "gchar*"),
    )));

    assert!(registry.lookup("Demo-1", "Name").is_none());
    let diagnostic = report.find("Name").expect("alias should be reported");
    assert_eq!(diagnostic.kind, DiagnosticKind::NotResolvable);
    assert!(diagnostic.message.contains("requires a pointer"));
}

// =============================================================================
// Classes
// =============================================================================

#[test]
fn test_class_declared_before_its_parent_resolves() {
    let ns = gobject()
        .with_class(IdlClass::new("Button", "GButton").with_parent("Widget"))
        .with_class(IdlClass::new("Widget", "GWidget").with_parent("Object"));
    let (registry, report) = build_with(object_config(), ns);

    let widget = registry.namespace("GObject-2").and_then(|ns| ns.find_local("Widget"));
    let Some(Type::Class(button)) = registry.lookup("GObject-2", "Button") else {
        panic!("Button should resolve");
    };
    assert_eq!(button.parent.as_ref().map(|p| p.hash), widget);
    assert!(report.resolver_passes >= 2);
    assert!(report.is_clean());
}

#[test]
fn test_class_without_parent_is_skipped() {
    let (registry, report) = build_with(object_config(), gobject().with_class(IdlClass::new("Orphan", "GOrphan")));

    assert!(registry.lookup("GObject-2", "Orphan").is_none());
    assert_eq!(report.find("Orphan").map(|d| d.kind), Some(DiagnosticKind::Skipped));
}

#[test]
fn test_class_struct_marks_record_and_finality() {
    let ns = gobject()
        .with_record(IdlRecord::new("WidgetClass", "GWidgetClass").with_gtype_struct_for("Widget"))
        .with_class(
            IdlClass::new("Widget", "GWidget")
                .with_parent("Object")
                .with_type_struct("WidgetClass"),
        )
        .with_class(IdlClass::new("Label", "GLabel").with_parent("Widget"));
    let (registry, _) = build_with(object_config(), ns);

    let Some(Type::Class(widget)) = registry.lookup("GObject-2", "Widget") else {
        panic!("Widget should resolve");
    };
    let Some(Type::Class(label)) = registry.lookup("GObject-2", "Label") else {
        panic!("Label should resolve");
    };
    assert!(!widget.is_final);
    assert!(label.is_final);

    let Some(Type::Record(class_struct)) = widget.type_struct.and_then(|h| registry.get(h)) else {
        panic!("WidgetClass should be the class struct");
    };
    assert_eq!(class_struct.gir_name, "WidgetClass");
    assert!(class_struct.type_struct_for.is_some());
    assert!(class_struct.conversions.to_native_full.is_none());
    assert!(class_struct.conversions.from_native_full.is_none());
    assert!(class_struct.conversions.to_native_none.is_some());
}

#[test]
fn test_cyclic_classes_are_dropped_without_progress() {
    let ns = gobject()
        .with_class(IdlClass::new("A", "GA").with_parent("B"))
        .with_class(IdlClass::new("B", "GB").with_parent("A"))
        .with_class(IdlClass::new("C", "GC").with_parent("Object"));
    let (registry, report) = build_with(object_config(), ns);

    assert!(registry.lookup("GObject-2", "A").is_none());
    assert!(registry.lookup("GObject-2", "B").is_none());
    assert!(matches!(registry.lookup("GObject-2", "C"), Some(Type::Class(_))));
    assert_eq!(report.find("A").map(|d| d.kind), Some(DiagnosticKind::Unresolved));
    assert_eq!(report.find("B").map(|d| d.kind), Some(DiagnosticKind::Unresolved));
    assert!(report.find("C").is_none());
    assert!(report.resolver_passes <= 4);
}

#[test]
fn test_redundant_interfaces_are_dropped() {
    let ns = gobject()
        .with_interface(IdlInterface::new("Buildable", "GBuildable"))
        .with_class(
            IdlClass::new("Widget", "GWidget")
                .with_parent("Object")
                .with_implements("Buildable"),
        )
        .with_class(
            IdlClass::new("Button", "GButton")
                .with_parent("Widget")
                .with_implements("Buildable")
                .with_implements("Buildable"),
        );
    let (registry, _) = build_with(object_config(), ns);

    let Some(Type::Class(widget)) = registry.lookup("GObject-2", "Widget") else {
        panic!("Widget should resolve");
    };
    let Some(Type::Class(button)) = registry.lookup("GObject-2", "Button") else {
        panic!("Button should resolve");
    };
    assert_eq!(widget.implements.len(), 1);
    assert!(button.implements.is_empty());
}

// =============================================================================
// Signatures
// =============================================================================

#[test]
fn test_out_boolean_becomes_target_return() {
    let (registry, _) = build(
        demo().with_function(
            IdlCallable::new("lookup", "demo_lookup")
                .with_param(IdlParameter::new("key", IdlType::new("utf8", "const gchar*")).with_transfer(Transfer::Full))
                .with_param(
                    IdlParameter::new("found", IdlType::new("gboolean", "gboolean*")).with_direction(Direction::Out),
                ),
        ),
    );
    let sig = signature(&registry, "lookup");

    assert_eq!(sig.target_params.len(), 1);
    assert_eq!(sig.target_returns.len(), 1);
    let found = sig.param(sig.target_returns[0]).expect("out param");
    assert_eq!(found.pointers, 0);
    assert_eq!(found.transfer, Transfer::None);

    assert_eq!(to_native(&registry, "lookup"), vec![Strategy::String]);
    assert_eq!(from_native(&registry, "lookup"), vec![Strategy::Boolean]);
}

#[test]
fn test_user_data_is_hidden_and_linked() {
    let (registry, _) = build(
        demo().with_callback(simple_callback("Func")).with_function(
            IdlCallable::new("foreach", "demo_foreach")
                .with_param(IdlParameter::new("count", gint()))
                .with_param(IdlParameter::new("func", IdlType::new("Func", "DemoFunc")).with_closure(2))
                .with_param(user_data(2)),
        ),
    );
    let sig = signature(&registry, "foreach");

    assert!(sig.params[2].implicit);
    assert!(sig.params[2].is_user_data);
    assert!(!sig.params[1].implicit);
    assert_eq!(sig.params[1].closure, Some(ParamSlot::Native(2)));
    assert_eq!(sig.target_params, vec![ParamSlot::Native(0), ParamSlot::Native(1)]);
}

#[test]
fn test_context_types_sort_first() {
    let config = Config::default().with_context_type("Demo.Cancellable");
    let (registry, _) = build_with(
        config,
        demo()
            .with_record(IdlRecord::new("Cancellable", "DemoCancellable"))
            .with_function(
                IdlCallable::new("load", "demo_load")
                    .with_param(IdlParameter::new("path", IdlType::new("filename", "const gchar*")))
                    .with_param(IdlParameter::new(
                        "cancellable",
                        IdlType::new("Cancellable", "DemoCancellable*"),
                    )),
            ),
    );
    let sig = signature(&registry, "load");
    assert_eq!(sig.target_params, vec![ParamSlot::Native(1), ParamSlot::Native(0)]);
}

#[test]
fn test_untyped_pointer_rejects_callable() {
    let (registry, report) = build(
        demo().with_function(
            IdlCallable::new("poke", "demo_poke")
                .with_param(IdlParameter::new("offset", gint()))
                .with_param(IdlParameter::new("label", IdlType::new("utf8", "const gchar*")))
                .with_param(IdlParameter::new("data", IdlType::new("gpointer", "gpointer"))),
        ),
    );

    assert!(registry.namespace("Demo-1").and_then(|ns| ns.function("poke")).is_none());
    assert_eq!(report.find("poke").map(|d| d.kind), Some(DiagnosticKind::CallableRejected));
}

// =============================================================================
// Records and Enums
// =============================================================================

#[test]
fn test_record_ref_free_and_copy_are_detected() {
    let self_param = || IdlParameter::new("boxed", IdlType::new("Boxed", "DemoBoxed*"));
    let (registry, _) = build(
        demo().with_record(
            IdlRecord::new("Boxed", "DemoBoxed")
                .with_method(IdlCallable::new("ref", "demo_boxed_ref").with_instance(self_param()))
                .with_method(IdlCallable::new("unref", "demo_boxed_unref").with_instance(self_param()))
                .with_method(
                    IdlCallable::new("copy", "demo_boxed_copy")
                        .with_instance(self_param())
                        .with_return(IdlReturnValue::new(IdlType::new("Boxed", "DemoBoxed*")).with_transfer(Transfer::Full)),
                ),
        ),
    );

    let Some(Type::Record(boxed)) = registry.lookup("Demo-1", "Boxed") else {
        panic!("Boxed should be a record");
    };
    assert_eq!(boxed.ref_function.as_deref(), Some("demo_boxed_ref"));
    assert_eq!(boxed.free_function.as_deref(), Some("demo_boxed_unref"));
    assert_eq!(boxed.copy_method().map(|m| m.c_identifier.as_str()), Some("demo_boxed_copy"));
    assert_eq!(boxed.methods.len(), 1);
}

#[test]
fn test_enum_members_fold_duplicate_values() {
    let (registry, _) = build(
        demo().with_enum(
            IdlEnum::new("State", "DemoState")
                .with_member(IdlMember::new("idle", "0", "DEMO_STATE_IDLE"))
                .with_member(IdlMember::new("busy", "1", "DEMO_STATE_BUSY"))
                .with_member(IdlMember::new("working", "1", "DEMO_STATE_WORKING"))
                .with_member(IdlMember::new("done", "0x2", "DEMO_STATE_DONE")),
        ),
    );

    let Some(Type::Enum(state)) = registry.lookup("Demo-1", "State") else {
        panic!("State should be an enum");
    };
    assert_eq!(state.members.len(), 4);
    let values: Vec<i32> = state.uniques().iter().map(|m| m.value).collect();
    assert_eq!(values.len(), 3);
    assert!(values.contains(&2));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_ignore_rules_skip_definitions() {
    let config = Config::default().with_namespace(
        "Demo-1",
        NamespaceConfig::new().with_ignore(IgnoreRule::regex("^legacy_")),
    );
    let (registry, report) = build_with(
        config,
        demo()
            .with_function(IdlCallable::new("legacy_init", "demo_legacy_init"))
            .with_function(IdlCallable::new("init", "demo_init")),
    );

    let ns = registry.namespace("Demo-1").expect("namespace");
    assert!(ns.function("legacy_init").is_none());
    assert!(ns.function("init").is_some());
    assert_eq!(report.find("legacy_init").map(|d| d.kind), Some(DiagnosticKind::Skipped));
}

#[test]
fn test_invalid_ignore_regex_aborts_build() {
    let config = Config::default().with_namespace("Demo-1", NamespaceConfig::new().with_ignore(IgnoreRule::regex("(")));
    let result = RegistryBuilder::new(config).with_repository(IdlRepository::new(demo())).build();
    assert!(matches!(result, Err(BuildError::InvalidRegex { .. })));
}

#[test]
fn test_version_window_filters_callables() {
    let deprecated = InfoAttrs {
        deprecated: true,
        deprecated_version: Some("1.2".to_string()),
        ..InfoAttrs::default()
    };
    let future = InfoAttrs {
        version: Some("3.0".to_string()),
        ..InfoAttrs::default()
    };
    let config = Config::default().with_namespace(
        "Demo-1",
        NamespaceConfig::new().with_min_version("1.4").with_max_version("2.0"),
    );
    let (registry, report) = build_with(
        config,
        demo()
            .with_function(IdlCallable::new("old", "demo_old").with_info(deprecated))
            .with_function(IdlCallable::new("new", "demo_new").with_info(future))
            .with_function(IdlCallable::new("stable", "demo_stable")),
    );

    let ns = registry.namespace("Demo-1").expect("namespace");
    assert!(ns.function("old").is_none());
    assert!(ns.function("new").is_none());
    assert!(ns.function("stable").is_some());
    assert_eq!(report.by_kind(DiagnosticKind::Skipped).count(), 2);
}

#[test]
fn test_manual_type_pre_empts_definition() {
    let config = Config::default().with_namespace(
        "Demo-1",
        NamespaceConfig::new().with_manual_type(Type::Record(Record::new("Rect", "ManualRect"))),
    );
    let (registry, report) = build_with(config, demo().with_record(IdlRecord::new("Rect", "DemoRect")));

    let Some(Type::Record(rect)) = registry.lookup("Demo-1", "Rect") else {
        panic!("Rect should be the manual record");
    };
    assert_eq!(rect.c_type, "ManualRect");
    assert_eq!(report.find("Rect").map(|d| d.kind), Some(DiagnosticKind::Skipped));
}

#[test]
fn test_ignored_namespace_is_not_built() {
    let config = Config::default().with_namespace("Demo-1", NamespaceConfig::ignored());
    let (registry, report) = build_with(config, demo().with_function(IdlCallable::new("init", "demo_init")));

    assert!(registry.namespace("Demo-1").is_none());
    assert_eq!(report.namespaces_ignored, 1);
}

// =============================================================================
// Includes
// =============================================================================

#[test]
fn test_includes_build_first_and_qualify_conversions() {
    let base = IdlNamespace::new("Base", "1.0")
        .with_prefixes("Base", "base")
        .with_record(IdlRecord::new("Point", "BasePoint"));
    let app = demo().with_function(
        IdlCallable::new("move_to", "demo_move_to")
            .with_param(IdlParameter::new("point", IdlType::new("Base.Point", "BasePoint*"))),
    );

    let (registry, _) = RegistryBuilder::default()
        .with_repository(IdlRepository::new(app).with_include("Base", "1.0"))
        .with_repository(IdlRepository::new(base))
        .build()
        .expect("build failed");

    let order: Vec<&str> = registry.namespaces().map(|ns| ns.versioned.as_str()).collect();
    assert_eq!(order, vec!["Base-1", "Demo-1"]);
    assert_eq!(
        to_native(&registry, "move_to"),
        vec![Strategy::Convertible {
            function: "base::Point::to_glib_full".to_string(),
            borrow: Borrow::Owned,
        }]
    );
}

// =============================================================================
// Conversions
// =============================================================================

#[test]
fn test_callback_scopes_emit_lifetimes() {
    let (registry, _) = build(
        demo()
            .with_callback(simple_callback("Func"))
            .with_callback(simple_callback("DestroyNotify"))
            .with_function(
                IdlCallable::new("run", "demo_run")
                    .with_param(
                        IdlParameter::new("func", IdlType::new("Func", "DemoFunc"))
                            .with_scope(CallbackScope::Call)
                            .with_closure(1),
                    )
                    .with_param(user_data(1)),
            )
            .with_function(
                IdlCallable::new("run_async", "demo_run_async")
                    .with_param(
                        IdlParameter::new("func", IdlType::new("Func", "DemoFunc"))
                            .with_scope(CallbackScope::Async)
                            .with_closure(1),
                    )
                    .with_param(user_data(1)),
            )
            .with_function(
                IdlCallable::new("watch", "demo_watch")
                    .with_param(
                        IdlParameter::new("func", IdlType::new("Func", "DemoFunc"))
                            .with_scope(CallbackScope::Notified)
                            .with_closure(1)
                            .with_destroy(2),
                    )
                    .with_param(user_data(1))
                    .with_param(IdlParameter::new("notify", IdlType::new("DestroyNotify", "DemoDestroyNotify"))),
            ),
    );

    let callback = |function: &str| match to_native(&registry, function).pop() {
        Some(Strategy::Callback(cb)) => cb,
        other => panic!("{function}: expected a callback strategy, got {other:?}"),
    };

    let call = callback("run");
    assert_eq!(call.trampoline, "_girbind_demo1_Func");
    assert_eq!(call.closure, "carg2");
    assert_eq!(call.register, "girbind_runtime::closures::register");
    assert!(call.delete_after_call.is_some());
    assert!(call.destroy.is_none());

    let once = callback("run_async");
    assert_eq!(once.register, "girbind_runtime::closures::register_once");
    assert!(once.delete_after_call.is_none());

    let notified = callback("watch");
    assert!(notified.delete_after_call.is_none());
    assert_eq!(
        notified.destroy,
        Some(("carg3".to_string(), "_girbind_demo1_DestroyNotify".to_string()))
    );

    let sig = signature(&registry, "run");
    let converters = CallableConverters::new(&registry, sig, ParameterMode::Callable);
    let mut w = IndentWriter::new();
    converters.apply_inputs(&mut w);
    converters.apply_outputs(&mut w);
    let code = w.into_string();
    assert!(code.contains("carg1 = Some(_girbind_demo1_Func);"));
    assert!(code.contains("girbind_runtime::closures::delete(carg2);"));
}

#[test]
fn test_nullable_values() {
    let (registry, _) = build(
        demo().with_record(IdlRecord::new("Rect", "DemoRect")).with_function(
            IdlCallable::new("frame", "demo_frame")
                .with_param(IdlParameter::new("title", IdlType::new("utf8", "const gchar*")).with_nullable())
                .with_param(
                    IdlParameter::new("area", IdlType::new("Rect", "DemoRect*"))
                        .with_transfer(Transfer::None)
                        .with_nullable(),
                ),
        ),
    );

    assert_eq!(
        to_native(&registry, "frame"),
        vec![
            Strategy::NullableString,
            Strategy::Nullable(Box::new(Strategy::Convertible {
                function: "Rect::to_glib_none".to_string(),
                borrow: Borrow::Owned,
            })),
        ]
    );
}

#[test]
fn test_transfer_selects_full_or_none_conversion() {
    let area = |transfer| IdlParameter::new("area", IdlType::new("Rect", "DemoRect*")).with_transfer(transfer);
    let (registry, _) = build(
        demo()
            .with_record(IdlRecord::new("Rect", "DemoRect"))
            .with_function(IdlCallable::new("take", "demo_take").with_param(area(Transfer::Full)))
            .with_function(IdlCallable::new("peek", "demo_peek").with_param(area(Transfer::None))),
    );

    let function = |name| match to_native(&registry, name).as_slice() {
        [Strategy::Convertible { function, .. }] => function.clone(),
        other => panic!("{name} should convert its record, got {other:?}"),
    };
    let take = function("take");
    let peek = function("peek");
    assert_eq!(take, "Rect::to_glib_full");
    assert_eq!(peek, "Rect::to_glib_none");
    assert_ne!(take, peek);
}

#[test]
fn test_container_return_converts_children() {
    let config = Config::default().with_namespace(
        "Demo-1",
        NamespaceConfig::new().with_manual_type(Type::Container(ContainerType::new("List", "GList", 1, "Vec<{0}>"))),
    );
    let (registry, _) = build_with(
        config,
        demo().with_function(
            IdlCallable::new("names", "demo_names").with_return(
                IdlReturnValue::new(IdlType::new("List", "GList*").with_inner(IdlType::new("utf8", "gchar*")))
                    .with_transfer(Transfer::Full),
            ),
        ),
    );

    assert_eq!(
        from_native(&registry, "names"),
        vec![Strategy::Container {
            function: "list_from_native_full".to_string(),
            children: vec![girbind::convert::ChildConverter::String {
                transfer: Transfer::Full,
            }],
        }]
    );
}

#[test]
fn test_fixed_arrays_cast_each_element() {
    let (registry, _) = build(
        demo().with_function(
            IdlCallable::new("set_matrix", "demo_set_matrix").with_param(IdlParameter::new(
                "values",
                IdlArray::new("gint*", gint().into())
                    .with_fixed_size(4)
                    .with_zero_terminated(false),
            )),
        ),
    );

    let strategies = to_native(&registry, "set_matrix");
    assert!(matches!(
        strategies.as_slice(),
        [Strategy::FixedArray { size: 4, target_element, .. }] if target_element == "i32"
    ));
}

#[test]
fn test_borrowed_return_is_tied_to_instance() {
    let ns = gobject()
        .with_record(IdlRecord::new("Rect", "GRect"))
        .with_class(
            IdlClass::new("Widget", "GWidget").with_parent("Object").with_method(
                IdlCallable::new("get_area", "g_widget_get_area")
                    .with_instance(IdlParameter::new("widget", IdlType::new("Widget", "GWidget*")))
                    .with_return(IdlReturnValue::new(IdlType::new("Rect", "GRect*")).with_transfer(Transfer::Borrow)),
            ),
        );
    let (registry, _) = build_with(object_config(), ns);

    let Some(Type::Class(widget)) = registry.lookup("GObject-2", "Widget") else {
        panic!("Widget should resolve");
    };
    let sig = &widget.method("get_area").expect("get_area").signature;
    let converters = CallableConverters::new(&registry, sig, ParameterMode::Callable);
    assert_eq!(
        converters.returns[0].strategy,
        Strategy::Convertible {
            function: "Rect::from_glib_borrow".to_string(),
            borrow: Borrow::TiedTo("widget".to_string()),
        }
    );
}

#[test]
fn test_missing_conversion_is_described() {
    let mut rect = Record::new("Rect", "DemoRect");
    rect.conversions = Conversions {
        to_native_full: None,
        ..Conversions::for_type("Rect")
    };
    let config = Config::default().with_namespace("Demo-1", NamespaceConfig::new().with_manual_type(Type::Record(rect)));
    let (registry, _) = build_with(config, demo());

    let hash = registry
        .namespace("Demo-1")
        .and_then(|ns| ns.find_local("Rect"))
        .expect("Rect");
    let param = Parameter {
        c_name: "carg1".to_string(),
        target_name: "rect".to_string(),
        ty: ParamType::Named(TypeRef::local(hash)),
        pointers: 1,
        c_type: "DemoRect*".to_string(),
        direction: Direction::In,
        transfer: Transfer::Full,
        flags: ParamFlags::empty(),
        scope: CallbackScope::Call,
        implicit: false,
        is_user_data: false,
        closure: None,
        destroy: None,
        borrow_from: None,
    };
    let sig = Signature {
        instance: None,
        params: vec![param],
        ret: None,
        target_params: vec![ParamSlot::Native(0)],
        target_returns: Vec::new(),
        throws: false,
    };

    let converter = select_to_native(&registry, &sig, &sig.params[0], &RuntimeHooks::default());
    assert!(converter.is_unimplemented());
    let description = converter.describe();
    assert!(description.contains("in"));
    assert!(description.contains("transfer: full"));
    assert!(description.contains("pointers: 1"));

    let mut w = IndentWriter::new();
    converter.apply(&mut w);
    assert!(w.as_str().contains("unimplemented!(\"to native"));
}

// =============================================================================
// Virtual Methods
// =============================================================================

#[test]
fn test_virtual_method_override_emission() {
    let ns = gobject()
        .with_record(
            IdlRecord::new("WidgetClass", "GWidgetClass")
                .with_gtype_struct_for("Widget")
                .with_field(IdlField::callback("draw")),
        )
        .with_class(
            IdlClass::new("Widget", "GWidget")
                .with_parent("Object")
                .with_type_struct("WidgetClass")
                .with_virtual_method(
                    IdlCallable::new("draw", "")
                        .with_instance(IdlParameter::new("widget", IdlType::new("Widget", "GWidget*")))
                        .with_param(IdlParameter::new("width", gint())),
                ),
        );
    let (registry, _) = build_with(object_config(), ns);

    let owner = registry.lookup("GObject-2", "Widget").expect("Widget");
    let vm = owner
        .as_class()
        .and_then(|c| c.virtual_method("draw"))
        .expect("draw should be overridable");

    let mut w = IndentWriter::new();
    emit_virtual_method_override(&registry, owner, vm, &RuntimeHooks::default(), &mut w).expect("emission failed");
    let code = w.into_string();
    assert!(code.contains("unsafe extern \"C\" fn _girbind_gobject2_Widget_draw("));
    assert!(code.contains("pub(crate) unsafe fn install_draw("));
    assert!(code.contains("(*class).draw = Some(_girbind_gobject2_Widget_draw);"));
    assert!(code.contains("girbind_runtime::class_data::peek_parent"));
}

// =============================================================================
// Post-processing
// =============================================================================

#[test]
fn test_mark_as_manually_extended() {
    let ns = gobject()
        .with_record(IdlRecord::new("Rect", "GRect"))
        .with_class(IdlClass::new("Widget", "GWidget").with_parent("Object"));

    let (registry, _) = RegistryBuilder::new(object_config())
        .with_repository(IdlRepository::new(ns.clone()))
        .with_post_processor(PostProcessor::mark_as_manually_extended("GObject-2", "Widget"))
        .build()
        .expect("build failed");
    let widget = registry.lookup("GObject-2", "Widget").and_then(Type::as_class);
    assert!(widget.is_some_and(|w| w.manually_extended));

    let result = RegistryBuilder::new(object_config())
        .with_repository(IdlRepository::new(ns))
        .with_post_processor(PostProcessor::mark_as_manually_extended("GObject-2", "Rect"))
        .build();
    assert!(matches!(result, Err(BuildError::PostProcess(_))));
}

#[test]
fn test_registry_is_shareable() {
    assert_send_sync::<Registry>();
    assert_send_sync::<BuildReport>();
}
