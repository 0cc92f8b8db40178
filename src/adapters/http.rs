use crate::adapters::graphql::{create_schema, GraphQLContext, Schema};
use crate::core::PropertyOrchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use juniper::http::GraphQLRequest;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub schema: Arc<Schema>,
    pub context: GraphQLContext,
}

impl AppState {
    pub fn new(orchestrator: Arc<PropertyOrchestrator>) -> Self {
        Self {
            schema: Arc::new(create_schema()),
            context: GraphQLContext::new(orchestrator),
        }
    }
}

/// Build the Axum application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/graphql", get(graphql_playground).post(graphql_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GraphQL POST endpoint
pub async fn graphql_handler(
    State(state): State<AppState>,
    Json(request): Json<GraphQLRequest>,
) -> Response {
    let response = request.execute(&state.schema, &state.context).await;
    let status = if response.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    (status, Json(response)).into_response()
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
}

pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

/// GraphQL playground (GraphiQL)
pub async fn graphql_playground() -> Html<&'static str> {
    Html(PLAYGROUND_HTML)
}

const PLAYGROUND_HTML: &str = r#"
<!DOCTYPE html>
<html>
<head>
    <title>Properties GraphQL</title>
    <style>
        body { height: 100%; margin: 0; width: 100%; overflow: hidden; }
        #graphiql { height: 100vh; }
    </style>
    <script crossorigin src="https://unpkg.com/react@18/umd/react.production.min.js"></script>
    <script crossorigin src="https://unpkg.com/react-dom@18/umd/react-dom.production.min.js"></script>
    <link rel="stylesheet" href="https://unpkg.com/graphiql/graphiql.min.css" />
</head>
<body>
    <div id="graphiql">Loading...</div>
    <script src="https://unpkg.com/graphiql/graphiql.min.js" type="application/javascript"></script>
    <script>
        const fetcher = GraphiQL.createFetcher({ url: '/graphql' });
        ReactDOM.render(
            React.createElement(GraphiQL, { fetcher: fetcher }),
            document.getElementById('graphiql'),
        );
    </script>
</body>
</html>
"#;
