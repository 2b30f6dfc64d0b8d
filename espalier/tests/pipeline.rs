use espalier::prelude::*;
use espalier::testing::Probe;
use std::sync::{Arc, Mutex};

fn body_text(res: Response) -> String {
    let (_, _, chunks) = res.into_parts();
    String::from_utf8(chunks.concat()).unwrap()
}

fn layered_app(probe: &Probe) -> App {
    App::builder()
        .before(probe.hook("before:root"))
        .after(probe.hook("after:root"))
        .route("a", |r| {
            r.before(probe.hook("before:a"));
            r.after(probe.hook("after:a"));
            r.route("b", |r| {
                r.before(probe.hook("before:b"));
                r.after(probe.hook("after:b"));
                r.get(probe.handler("handler", "leaf"));
            });
        })
        .build()
}

#[tokio::test]
async fn hooks_run_outside_in_then_inside_out() {
    let probe = Probe::new();
    let app = layered_app(&probe);

    let res = app.dispatch(Request::get("/a/b")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(body_text(res), "leaf");
    assert_eq!(
        probe.log(),
        [
            "before:root",
            "before:a",
            "before:b",
            "handler",
            "after:b",
            "after:a",
            "after:root",
        ]
    );
}

#[tokio::test]
async fn hooks_above_the_matched_node_do_not_run_for_siblings() {
    let probe = Probe::new();
    let app = App::builder()
        .route("a", |r| {
            r.before(probe.hook("before:a"));
            r.get(probe.handler("handler:a", "a"));
        })
        .route("z", |r| {
            r.before(probe.hook("before:z"));
            r.get(probe.handler("handler:z", "z"));
        })
        .build();

    app.dispatch(Request::get("/z")).await.unwrap();
    assert_eq!(probe.log(), ["before:z", "handler:z"]);
}

#[tokio::test]
async fn finishing_in_a_before_hook_skips_deeper_befores_and_the_handler() {
    let probe = Probe::new();
    let app = App::builder()
        .before(probe.hook("before:root"))
        .after(probe.hook("after:root"))
        .route("a", |r| {
            r.before(probe.finishing_hook("finish:a"));
            r.after(probe.hook("after:a"));
            r.route("b", |r| {
                r.before(probe.hook("before:b"));
                r.after(probe.hook("after:b"));
                r.get(probe.handler("handler", "leaf"));
            });
        })
        .build();

    let res = app.dispatch(Request::get("/a/b")).await.unwrap();
    assert!(res.is_finished());
    // b's before-hooks never ran, so b's after-hooks don't either; the
    // after phase starts at the finishing node.
    assert_eq!(probe.log(), ["before:root", "finish:a", "after:a", "after:root"]);
}

#[tokio::test]
async fn finishing_skips_the_same_nodes_remaining_before_hooks() {
    let probe = Probe::new();
    let app = App::builder()
        .route("a", |r| {
            r.before(probe.finishing_hook("finish"));
            r.before(probe.hook("skipped"));
            r.after(probe.hook("after:a"));
            r.get(probe.handler("handler", "leaf"));
        })
        .build();

    app.dispatch(Request::get("/a")).await.unwrap();
    assert_eq!(probe.log(), ["finish", "after:a"]);
}

#[tokio::test]
async fn a_finished_response_ignores_the_handler_return_value() {
    let app = App::builder()
        .route("a", |r| {
            r.get(HandlerFn::new(|_req: &mut Request, res: &mut Response| {
                res.set_status(202);
                res.finish();
                Ok("ignored".into())
            }));
        })
        .build();

    let res = app.dispatch(Request::get("/a")).await.unwrap();
    assert_eq!(res.status(), 202);
    assert!(body_text(res).is_empty());
}

#[tokio::test]
async fn a_raw_body_set_by_a_hook_wins_over_the_handler_return_value() {
    let app = App::builder()
        .before(HookFn::new(|_req: &mut Request, res: &mut Response| {
            res.set_raw_body(vec![b"raw".to_vec()]);
            Ok(())
        }))
        .route("a", |r| {
            r.get(HandlerFn::new(|_req: &mut Request, _res: &mut Response| {
                Ok("structured".into())
            }));
        })
        .build();

    let res = app.dispatch(Request::get("/a")).await.unwrap();
    assert_eq!(body_text(res), "raw");
}

#[tokio::test]
async fn after_hooks_still_run_on_a_finished_response() {
    let probe = Probe::new();
    let appended = Arc::new(Mutex::new(false));
    let flag = appended.clone();
    let app = App::builder()
        .after(HookFn::new(move |_req: &mut Request, res: &mut Response| {
            *flag.lock().unwrap() = true;
            res.set_header("x-seen", "yes");
            Ok(())
        }))
        .route("a", |r| {
            r.before(probe.finishing_hook("finish"));
            r.get(probe.handler("handler", "leaf"));
        })
        .build();

    let res = app.dispatch(Request::get("/a")).await.unwrap();
    assert!(*appended.lock().unwrap());
    assert_eq!(res.header("x-seen"), Some("yes"));
}

#[tokio::test]
async fn hooks_can_pass_attributes_down_to_the_handler() {
    let app = App::builder()
        .before(HookFn::new(|req: &mut Request, _res: &mut Response| {
            req.attributes_mut().set("greeting", String::from("salve"));
            Ok(())
        }))
        .route("a", |r| {
            r.get(HandlerFn::new(|req: &mut Request, _res: &mut Response| {
                let greeting = req
                    .attributes()
                    .get::<String>("greeting")
                    .cloned()
                    .unwrap_or_default();
                Ok(greeting.into())
            }));
        })
        .build();

    let res = app.dispatch(Request::get("/a")).await.unwrap();
    assert_eq!(body_text(res), "salve");
}

#[tokio::test]
async fn attributes_written_during_a_dispatch_do_not_leak_into_the_next() {
    let app = App::builder()
        .attribute("shared", 1u32)
        .route("a", |r| {
            r.get(HandlerFn::new(|req: &mut Request, _res: &mut Response| {
                let seen = req.attributes().contains("scratch");
                req.attributes_mut().set("scratch", true);
                Ok(if seen { "stale" } else { "fresh" }.into())
            }));
        })
        .build();

    let first = app.dispatch(Request::get("/a")).await.unwrap();
    assert_eq!(body_text(first), "fresh");
    let second = app.dispatch(Request::get("/a")).await.unwrap();
    assert_eq!(body_text(second), "fresh");
}

#[tokio::test]
async fn nested_attribute_values_are_shared_between_dispatches() {
    let app = App::builder()
        .attribute("counter", Mutex::new(0u32))
        .route("a", |r| {
            r.get(HandlerFn::new(|req: &mut Request, _res: &mut Response| {
                let count = match req.attributes().get::<Mutex<u32>>("counter") {
                    Some(counter) => {
                        let mut guard = counter.lock().unwrap();
                        *guard += 1;
                        *guard
                    }
                    None => 0,
                };
                Ok(count.to_string().into())
            }));
        })
        .build();

    // The bag is copied shallowly, so the Mutex inside is the same object
    // on every dispatch.
    assert_eq!(body_text(app.dispatch(Request::get("/a")).await.unwrap()), "1");
    assert_eq!(body_text(app.dispatch(Request::get("/a")).await.unwrap()), "2");
}
