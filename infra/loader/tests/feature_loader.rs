use futures_util::poll;
use hatch_host::{MemoryDocument, Route, ScriptEvent, TokioTimer};
use hatch_loader::{FeatureDescriptor, FeatureLoader, LoadError, ScriptInjector};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

fn loader() -> (MemoryDocument, FeatureLoader) {
    let document = MemoryDocument::new();
    (document.clone(), FeatureLoader::new(ScriptInjector::new(document, TokioTimer)))
}

#[tokio::test]
async fn available_capability_skips_acquisition() {
    let (document, loader) = loader();
    let loader_calls = Rc::new(Cell::new(0));

    let calls = Rc::clone(&loader_calls);
    let via_loader = FeatureDescriptor::builder("ready")
        .check(|| Some(7))
        .loader(move || {
            calls.set(calls.get() + 1);
            async { Ok(()) }
        })
        .build();
    let via_script = FeatureDescriptor::builder("ready-script")
        .check(|| Some("native"))
        .script("/never.js")
        .build();

    assert_eq!(loader.ensure(&via_loader).await.expect("ready"), 7);
    assert_eq!(loader.ensure(&via_script).await.expect("ready"), "native");
    assert_eq!(loader_calls.get(), 0);
    assert_eq!(document.injections("/never.js"), 0);
}

#[tokio::test]
async fn script_acquisition_then_recheck() {
    let (document, loader) = loader();
    let installed = Rc::new(Cell::new(false));
    let checks = Rc::new(Cell::new(0));

    let flag = Rc::clone(&installed);
    document.route("/polyfill.js", Route::load_with(move || flag.set(true)));

    let (present, counter) = (Rc::clone(&installed), Rc::clone(&checks));
    let feature = FeatureDescriptor::builder("polyfill")
        .check(move || {
            counter.set(counter.get() + 1);
            present.get().then_some("registry")
        })
        .script("/polyfill.js")
        .build();

    assert_eq!(loader.ensure(&feature).await.expect("should load"), "registry");
    assert_eq!(checks.get(), 2);
    assert_eq!(document.injections("/polyfill.js"), 1);
    assert!(!document.is_attached("/polyfill.js"));
}

#[tokio::test]
async fn still_missing_after_load_is_feature_unavailable() {
    let (document, loader) = loader();
    document.route("/useless.js", Route::load());

    let feature = FeatureDescriptor::builder("custom-elements")
        .check(|| None::<()>)
        .script("/useless.js")
        .build();

    let err = loader.ensure(&feature).await.expect_err("check never succeeds");

    assert!(matches!(err, LoadError::FeatureUnavailable { .. }));
    assert_eq!(err.to_string(), "Feature not available after loading source: custom-elements");
}

#[tokio::test]
async fn loader_errors_propagate_unchanged() {
    let (_, loader) = loader();
    let feature = FeatureDescriptor::builder("ui")
        .check(|| None::<()>)
        .loader(|| async { Err(LoadError::loader("chunk 42 failed")) })
        .build();

    let err = loader.ensure(&feature).await.expect_err("loader fails");

    assert!(matches!(err, LoadError::Loader { ref message, .. } if message == "chunk 42 failed"));
}

#[tokio::test]
async fn script_errors_propagate_unchanged() {
    let (document, loader) = loader();
    document.route("/missing.js", Route::error());

    let feature =
        FeatureDescriptor::builder("missing").check(|| None::<()>).script("/missing.js").build();

    let err = loader.ensure(&feature).await.expect_err("script fails");
    assert!(matches!(err, LoadError::ScriptLoadFailed { .. }));
}

#[tokio::test(start_paused = true)]
async fn loader_strategy_has_no_timeout() {
    let (_, loader) = loader();
    let done = Rc::new(Cell::new(false));

    let (flag, present) = (Rc::clone(&done), Rc::clone(&done));
    let feature = FeatureDescriptor::builder("slow")
        .check(move || present.get().then_some(()))
        .loader(move || {
            let flag = Rc::clone(&flag);
            async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                flag.set(true);
                Ok(())
            }
        })
        .build();

    loader.ensure(&feature).await.expect("slow loader still succeeds");
}

#[test]
fn descriptor_reports_strategy() {
    let feature = FeatureDescriptor::builder("polyfill")
        .check(|| Some(()))
        .script("/polyfill.js")
        .max_timeout(Duration::ZERO)
        .build();

    assert_eq!(feature.name(), "polyfill");
    assert_eq!(feature.script_src(), Some("/polyfill.js"));
    assert!(format!("{feature:?}").contains("script"));
}

const POLYFILL: &str = "/polyfill.js";

/// Descriptor whose capability appears once `installed` is set; the host settles only on `fire`.
fn held_polyfill(document: &MemoryDocument) -> (Rc<Cell<bool>>, FeatureDescriptor<&'static str>) {
    document.route(POLYFILL, Route::hold());
    let installed = Rc::new(Cell::new(false));
    let present = Rc::clone(&installed);
    let feature = FeatureDescriptor::builder("custom-elements")
        .check(move || present.get().then_some("registry"))
        .script(POLYFILL)
        .build();
    (installed, feature)
}

#[tokio::test]
async fn concurrent_ensures_share_one_injection() {
    let (document, loader) = loader();
    let (installed, feature) = held_polyfill(&document);

    let (first, second, ()) = tokio::join!(loader.ensure(&feature), loader.ensure(&feature), async {
        tokio::task::yield_now().await;
        assert_eq!(loader.pending(), 1);
        installed.set(true);
        assert!(document.fire(POLYFILL, ScriptEvent::Load));
    });

    assert_eq!(first.expect("first caller"), "registry");
    assert_eq!(second.expect("second caller"), "registry");
    assert_eq!(document.injections(POLYFILL), 1);
    assert!(!document.is_attached(POLYFILL));
    assert_eq!(loader.pending(), 0);
}

#[tokio::test]
async fn concurrent_ensures_share_the_failure() {
    let (document, loader) = loader();
    let (_, feature) = held_polyfill(&document);

    let (first, second, ()) = tokio::join!(loader.ensure(&feature), loader.ensure(&feature), async {
        tokio::task::yield_now().await;
        assert!(document.fire(POLYFILL, ScriptEvent::Error));
    });

    assert!(matches!(first, Err(LoadError::ScriptLoadFailed { .. })));
    assert!(matches!(second, Err(LoadError::ScriptLoadFailed { .. })));
    assert_eq!(document.injections(POLYFILL), 1);
}

#[tokio::test]
async fn dropping_one_waiter_keeps_the_acquisition() {
    let (document, loader) = loader();
    let (installed, feature) = held_polyfill(&document);

    let mut first = Box::pin(loader.ensure(&feature));
    let mut second = Box::pin(loader.ensure(&feature));
    assert!(poll!(first.as_mut()).is_pending());
    assert!(poll!(second.as_mut()).is_pending());

    drop(first);
    assert!(document.is_attached(POLYFILL));

    installed.set(true);
    assert!(document.fire(POLYFILL, ScriptEvent::Load));
    assert_eq!(second.await.expect("remaining caller"), "registry");
    assert_eq!(document.injections(POLYFILL), 1);
}

#[tokio::test]
async fn dropping_every_waiter_abandons_the_acquisition() {
    let (document, loader) = loader();
    let (installed, feature) = held_polyfill(&document);

    let mut first = Box::pin(loader.ensure(&feature));
    assert!(poll!(first.as_mut()).is_pending());
    drop(first);

    assert!(!document.is_attached(POLYFILL), "abandoned script node is removed");
    assert_eq!(loader.pending(), 0);

    // A later caller starts over.
    let (retry, ()) = tokio::join!(loader.ensure(&feature), async {
        tokio::task::yield_now().await;
        installed.set(true);
        assert!(document.fire(POLYFILL, ScriptEvent::Load));
    });
    assert_eq!(retry.expect("retry"), "registry");
    assert_eq!(document.injections(POLYFILL), 2);
}

#[tokio::test]
async fn concurrent_ensures_call_the_loader_once() {
    let (_, loader) = loader();
    let done = Rc::new(Cell::new(false));
    let calls = Rc::new(Cell::new(0));

    let (flag, present, counter) = (Rc::clone(&done), Rc::clone(&done), Rc::clone(&calls));
    let feature = FeatureDescriptor::builder("ui")
        .check(move || present.get().then_some(()))
        .loader(move || {
            counter.set(counter.get() + 1);
            let flag = Rc::clone(&flag);
            async move {
                tokio::task::yield_now().await;
                flag.set(true);
                Ok(())
            }
        })
        .build();

    let (first, second) = tokio::join!(loader.ensure(&feature), loader.ensure(&feature));

    assert!(first.is_ok() && second.is_ok());
    assert_eq!(calls.get(), 1);
}
