use espalier::prelude::*;
use espalier::testing::{Probe, StorageOffline, ValidationFailed};

fn body_text(res: Response) -> String {
    let (_, _, chunks) = res.into_parts();
    String::from_utf8(chunks.concat()).unwrap()
}

fn hello_app() -> App {
    App::builder()
        .route("hello", |r| {
            r.get(HandlerFn::new(|_req: &mut Request, _res: &mut Response| {
                Ok("hello".into())
            }));
        })
        .build()
}

#[tokio::test]
async fn mounted_routes_answer_under_the_mount_point() {
    let inner = hello_app();
    let app = App::builder()
        .route("i", |r| {
            r.route("say", |r| {
                r.mount(&inner);
            });
        })
        .route("oh", |r| {
            r.mount(&inner);
        })
        .build();

    let res = app.dispatch(Request::get("/i/say/hello")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(body_text(res), "hello");

    let res = app.dispatch(Request::get("/oh/hello")).await.unwrap();
    assert_eq!(body_text(res), "hello");
}

#[tokio::test]
async fn an_app_can_be_mounted_more_than_once() {
    let inner = hello_app();
    let app = App::builder()
        .route("en", |r| {
            r.mount(&inner);
        })
        .route("la", |r| {
            r.mount(&inner);
        })
        .build();

    assert_eq!(
        app.dispatch(Request::get("/en/hello")).await.unwrap().status(),
        200
    );
    assert_eq!(
        app.dispatch(Request::get("/la/hello")).await.unwrap().status(),
        200
    );
}

#[tokio::test]
async fn mounted_top_level_hooks_wrap_outside_the_inner_routes_hooks() {
    let probe = Probe::new();
    let inner = App::builder()
        .before(probe.hook("before:inner-root"))
        .after(probe.hook("after:inner-root"))
        .route("x", |r| {
            r.before(probe.hook("before:inner-x"));
            r.after(probe.hook("after:inner-x"));
            r.get(probe.handler("handler", "leaf"));
        })
        .build();
    let app = App::builder()
        .before(probe.hook("before:root"))
        .after(probe.hook("after:root"))
        .route("p", |r| {
            r.before(probe.hook("before:p"));
            r.after(probe.hook("after:p"));
            r.mount(&inner);
        })
        .build();

    let res = app.dispatch(Request::get("/p/x")).await.unwrap();
    assert_eq!(body_text(res), "leaf");
    assert_eq!(
        probe.log(),
        [
            "before:root",
            "before:p",
            "before:inner-root",
            "before:inner-x",
            "handler",
            "after:inner-x",
            "after:inner-root",
            "after:p",
            "after:root",
        ]
    );
}

#[tokio::test]
async fn a_mounted_wildcard_still_captures() {
    let inner = App::builder()
        .wildcard("name", |r| {
            r.get(HandlerFn::new(|req: &mut Request, _res: &mut Response| {
                let name = req.param("name").unwrap_or("").to_string();
                Ok(name.into())
            }));
        })
        .build();
    let app = App::builder()
        .route("greet", |r| {
            r.mount(&inner);
        })
        .build();

    let res = app.dispatch(Request::get("/greet/ada")).await.unwrap();
    assert_eq!(body_text(res), "ada");
}

#[tokio::test]
async fn a_later_mount_shadows_a_colliding_route() {
    let first = App::builder()
        .route("dup", |r| {
            r.get(HandlerFn::new(|_req: &mut Request, _res: &mut Response| {
                Ok("first".into())
            }));
        })
        .build();
    let second = App::builder()
        .route("dup", |r| {
            r.get(HandlerFn::new(|_req: &mut Request, _res: &mut Response| {
                Ok("second".into())
            }));
        })
        .build();
    let app = App::builder().mount(&first).mount(&second).build();

    let res = app.dispatch(Request::get("/dup")).await.unwrap();
    assert_eq!(body_text(res), "second");
}

#[tokio::test]
async fn a_mount_shadows_an_earlier_inline_route() {
    let mounted = App::builder()
        .route("dup", |r| {
            r.get(HandlerFn::new(|_req: &mut Request, _res: &mut Response| {
                Ok("mounted".into())
            }));
        })
        .build();
    let app = App::builder()
        .route("dup", |r| {
            r.get(HandlerFn::new(|_req: &mut Request, _res: &mut Response| {
                Ok("inline".into())
            }));
        })
        .mount(&mounted)
        .build();

    let res = app.dispatch(Request::get("/dup")).await.unwrap();
    assert_eq!(body_text(res), "mounted");
}

#[tokio::test]
async fn mounts_nest() {
    let innermost = hello_app();
    let middle = App::builder()
        .route("mid", |r| {
            r.mount(&innermost);
        })
        .build();
    let app = App::builder()
        .route("top", |r| {
            r.mount(&middle);
        })
        .build();

    let res = app
        .dispatch(Request::get("/top/mid/hello"))
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(body_text(res), "hello");
}

#[tokio::test]
async fn mounting_a_hook_free_app_adds_no_layer() {
    let probe = Probe::new();
    let inner = App::builder()
        .route("x", |r| {
            r.get(probe.handler("handler", "leaf"));
        })
        .build();
    let app = App::builder()
        .before(probe.hook("before:root"))
        .mount(&inner)
        .build();

    let res = app.dispatch(Request::get("/x")).await.unwrap();
    assert_eq!(body_text(res), "leaf");
    assert_eq!(probe.log(), ["before:root", "handler"]);
}

#[tokio::test]
async fn a_mounted_rescue_entry_covers_the_mounted_routes() {
    let probe = Probe::new();
    let inner = App::builder()
        .rescue_from::<ValidationFailed>(RescueFn::new(
            |_err: &DynError, _req: &mut Request, res: &mut Response| {
                res.set_status(200);
                res.set_body("recovered");
                Ok(())
            },
        ))
        .route("x", |r| {
            r.get(probe.failing_handler("handler", || ValidationFailed));
        })
        .build();
    let app = App::builder()
        .route("p", |r| {
            r.mount(&inner);
        })
        .build();

    let res = app.dispatch(Request::get("/p/x")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(body_text(res), "recovered");
}

#[tokio::test]
async fn a_failing_rescue_inside_a_mount_is_retried_at_the_mounted_root() {
    let probe = Probe::new();
    let failing = {
        let probe = probe.clone();
        RescueFn::new(move |_err: &DynError, _req: &mut Request, _res: &mut Response| {
            probe.record("rescue:x");
            Err(Box::new(StorageOffline("during recovery")) as BoxError)
        })
    };
    let recovering = {
        let probe = probe.clone();
        RescueFn::new(move |_err: &DynError, _req: &mut Request, res: &mut Response| {
            probe.record("rescue:inner-root");
            res.set_status(200);
            res.set_body("recovered");
            Ok(())
        })
    };
    let inner = App::builder()
        .rescue_from::<StorageOffline>(recovering)
        .route("x", |r| {
            r.rescue_from::<ValidationFailed>(failing);
            r.get(probe.failing_handler("handler", || ValidationFailed));
        })
        .build();
    let app = App::builder()
        .route("p", |r| {
            r.mount(&inner);
        })
        .build();

    // The mounted root is one level out from `x`, so its entries are
    // retried when x's rescue handler raises.
    let res = app.dispatch(Request::get("/p/x")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(body_text(res), "recovered");
    assert_eq!(probe.log(), ["handler", "rescue:x", "rescue:inner-root"]);
}

#[tokio::test]
async fn finishing_at_the_mounted_root_skips_the_inner_routes_after_hooks() {
    let probe = Probe::new();
    let inner = App::builder()
        .before(probe.finishing_hook("finish:inner-root"))
        .after(probe.hook("after:inner-root"))
        .route("x", |r| {
            r.before(probe.hook("before:x"));
            r.after(probe.hook("after:x"));
            r.get(probe.handler("handler", "leaf"));
        })
        .build();
    let app = App::builder()
        .route("p", |r| {
            r.mount(&inner);
        })
        .build();

    let res = app.dispatch(Request::get("/p/x")).await.unwrap();
    assert!(res.is_finished());
    // x's before-hook never ran, so its after-hook must not run either;
    // the after phase starts at the mount layer that finished.
    assert_eq!(probe.log(), ["finish:inner-root", "after:inner-root"]);
}

#[tokio::test]
async fn scoped_hooks_cover_only_the_scoped_routes() {
    let probe = Probe::new();
    let app = App::builder()
        .scope(|s| {
            s.before(probe.hook("before:scope"));
            s.route("inside", |r| {
                r.get(probe.handler("handler:inside", "in"));
            });
        })
        .route("outside", |r| {
            r.get(probe.handler("handler:outside", "out"));
        })
        .build();

    app.dispatch(Request::get("/inside")).await.unwrap();
    assert_eq!(probe.log(), ["before:scope", "handler:inside"]);

    probe.clear();
    app.dispatch(Request::get("/outside")).await.unwrap();
    assert_eq!(probe.log(), ["handler:outside"]);
}

#[tokio::test]
async fn head_against_a_mounted_get_route_reuses_the_handler() {
    let inner = App::builder()
        .route("doc", |r| {
            r.get(HandlerFn::new(|_req: &mut Request, res: &mut Response| {
                res.set_header("content-type", "text/plain");
                Ok("the document".into())
            }));
        })
        .build();
    let app = App::builder()
        .route("files", |r| {
            r.mount(&inner);
        })
        .build();

    let res = app.dispatch(Request::head("/files/doc")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.header("content-type"), Some("text/plain"));
    assert!(body_text(res).is_empty());
}

#[tokio::test]
async fn mounted_app_attributes_are_not_carried_over() {
    let inner = App::builder()
        .attribute("origin", String::from("inner"))
        .route("x", |r| {
            r.get(HandlerFn::new(|req: &mut Request, _res: &mut Response| {
                let origin = req
                    .attributes()
                    .get::<String>("origin")
                    .cloned()
                    .unwrap_or_else(|| String::from("unset"));
                Ok(origin.into())
            }));
        })
        .build();
    let app = App::builder()
        .route("p", |r| {
            r.mount(&inner);
        })
        .build();

    // Only the dispatching app's prototype bag is seeded.
    let res = app.dispatch(Request::get("/p/x")).await.unwrap();
    assert_eq!(body_text(res), "unset");

    let res = inner.dispatch(Request::get("/x")).await.unwrap();
    assert_eq!(body_text(res), "inner");
}
