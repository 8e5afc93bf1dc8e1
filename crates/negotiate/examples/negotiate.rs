use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full};
use micro_negotiate::format::{json_decoder, json_encoder, text_encoder, yaml_decoder, yaml_encoder};
use micro_negotiate::{Handler, Reply, RequestDecoder, ResponseHandler};
use serde::Deserialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Deserialize, Debug, Default)]
struct User {
    name: String,
    zip: String,
}

async fn create_user(decoder: RequestDecoder, req: Request<Full<Bytes>>) -> Reply {
    let mut user = User::default();
    match decoder.decode_body(Some(req), &mut user).await {
        Ok(_) => {
            info!(?user, "receive user");
            Reply::new(StatusCode::CREATED)
                .with_body(serde_json::json!({ "name": user.name, "zip": user.zip }))
                .with_header("x-created-by", "micro-negotiate")
        }
        Err(e) => Reply::new(StatusCode::BAD_REQUEST).with_body(e.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let decoder = RequestDecoder::builder().decoder(json_decoder()).decoder(yaml_decoder()?).build();

    let handler = ResponseHandler::builder(move |req| create_user(decoder.clone(), req))
        .encoder(json_encoder())
        .encoder(yaml_encoder()?)
        .encoder(text_encoder())
        .build();

    let requests = [
        ("application/json", "application/yaml", r#"{"name":"hello","zip":"world"}"#),
        ("application/yaml", "application/json", "name: hello\nzip: world\n"),
        ("application/json", "text/plain", r#"{"name":"hello"}"#),
        ("application/json", "", r#"{"name":"hello","zip":"world"}"#),
    ];

    for (content_type, accept, body) in requests {
        let mut builder = Request::builder().method("POST").uri("/users").header(CONTENT_TYPE, content_type);
        if !accept.is_empty() {
            builder = builder.header(ACCEPT, accept);
        }
        let req = builder.body(Full::from(body))?;

        let resp = match handler.call(req).await {
            Ok(resp) => resp,
            Err(never) => match never {},
        };
        let status = resp.status();
        let resp_content_type = resp.headers()[CONTENT_TYPE].to_str().unwrap_or_default().to_string();
        let bytes = resp.into_body().collect().await.map(|c| c.to_bytes()).unwrap_or_default();

        println!("accept '{accept}' -> {status} {resp_content_type}\n{}\n", String::from_utf8_lossy(&bytes));
    }
    Ok(())
}
