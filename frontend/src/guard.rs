//! 受保护路由守卫
//!
//! 包装一个处理器：每次导航都先向后端确认会话，未通过时跳转登录页，
//! 内层处理器不会被调用。

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::auth::Session;
use crate::web::dom::Location;
use crate::web::router::{Handler, Rendered, RouteContext};

pub fn protected(session: Rc<Session>, navigator: Rc<dyn Location>, handler: Handler) -> Handler {
    Rc::new(move |ctx: RouteContext| -> LocalBoxFuture<'static, Rendered> {
        let session = Rc::clone(&session);
        let navigator = Rc::clone(&navigator);
        let handler = Rc::clone(&handler);
        Box::pin(async move {
            if !session.require_auth(navigator.as_ref(), &ctx.ticket).await {
                return Rendered::Redirected;
            }
            handler(ctx).await
        })
    })
}
