use serde::de::DeserializeOwned;
use std::collections::HashMap;
use worker::{Fetch, Headers, Request, RequestInit, wasm_bindgen};

use crate::error::{AppError, Result};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::VecDeque;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl From<HttpMethod> for worker::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => worker::Method::Get,
            HttpMethod::Post => worker::Method::Post,
            HttpMethod::Patch => worker::Method::Patch,
            HttpMethod::Delete => worker::Method::Delete,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    fn method_label(&self) -> String {
        format!("{:?} {}", self.method, self.url)
    }
}

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| AppError::store(format!("Unexpected response body: {e}")))
    }
}

#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse>;
}

// =========================================================
// 实现层: Worker 客户端
// =========================================================

#[derive(Clone)]
pub struct WorkerHttpClient;

#[async_trait::async_trait(?Send)]
impl HttpClient for WorkerHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        let headers = Headers::new();
        for (k, v) in &req.headers {
            headers.set(k, v)?;
        }

        let mut init = RequestInit {
            method: req.method.into(),
            headers,
            ..Default::default()
        };

        if let Some(body_str) = &req.body {
            init.body = Some(wasm_bindgen::JsValue::from_str(body_str));
        }

        let worker_req = Request::new_with_init(&req.url, &init)?;
        // fetch 失败说明存储服务不可达，From<worker::Error> 映射为 503
        let mut response = Fetch::Request(worker_req)
            .send()
            .await
            .map_err(|e| AppError::from(e).in_op_with("http.send", req.method_label()))?;

        Ok(HttpResponse {
            status: response.status_code(),
            body: response.text().await?,
        })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

/// 按顺序回放预设响应，并记录发出的请求
#[cfg(test)]
pub struct MockHttpClient {
    responses: RefCell<VecDeque<(u16, String)>>,
    pub requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, status: u16, body: serde_json::Value) {
        self.responses
            .borrow_mut()
            .push_back((status, body.to_string()));
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        self.requests.borrow_mut().push(req);

        match self.responses.borrow_mut().pop_front() {
            Some((status, body)) => Ok(HttpResponse { status, body }),
            None => Err(AppError::unavailable("connection refused")),
        }
    }
}
