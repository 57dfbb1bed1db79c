use axum::{
    response::{Html, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};

/// Success envelope wrapping `data`
fn envelope(data: Value) -> Value {
    json!({
        "allOf": [
            { "$ref": "#/components/schemas/Response" },
            {
                "type": "object",
                "properties": { "data": data }
            }
        ]
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": { "schema": schema }
        }
    })
}

fn envelope_response(description: &str) -> Value {
    json_response(description, json!({ "$ref": "#/components/schemas/Response" }))
}

fn user_id_parameter() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "User ID",
        "schema": { "type": "integer", "minimum": 0 }
    })
}

/// Build the OpenAPI document for the user API
pub fn openapi_document() -> Value {
    let user = json!({ "$ref": "#/components/schemas/User" });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "User API",
            "description": "CRUD service for users with automatic request binding and validation",
            "version": env!("CARGO_PKG_VERSION"),
            "license": {
                "name": "MIT",
                "url": "https://opensource.org/licenses/MIT"
            }
        },
        "servers": [
            {
                "url": "/api/v1",
                "description": "Version 1 API"
            }
        ],
        "paths": {
            "/users": {
                "post": {
                    "tags": ["users"],
                    "summary": "Create a new user",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/CreateUserRequest" }
                            }
                        }
                    },
                    "responses": {
                        "200": json_response("User created successfully", envelope(user.clone())),
                        "400": envelope_response("Invalid request body"),
                        "500": envelope_response("Internal server error")
                    }
                },
                "get": {
                    "tags": ["users"],
                    "summary": "Get users list",
                    "description": "Paginated list of users with optional case-insensitive substring filters",
                    "parameters": [
                        {
                            "name": "page",
                            "in": "query",
                            "description": "Page number",
                            "schema": { "type": "integer", "minimum": 1, "default": 1 }
                        },
                        {
                            "name": "page_size",
                            "in": "query",
                            "description": "Page size",
                            "schema": { "type": "integer", "minimum": 1, "maximum": 100, "default": 10 }
                        },
                        {
                            "name": "name",
                            "in": "query",
                            "description": "Filter by name",
                            "schema": { "type": "string" }
                        },
                        {
                            "name": "email",
                            "in": "query",
                            "description": "Filter by email",
                            "schema": { "type": "string" }
                        }
                    ],
                    "responses": {
                        "200": json_response(
                            "Users retrieved successfully",
                            envelope(json!({ "$ref": "#/components/schemas/UserList" }))
                        ),
                        "400": envelope_response("Invalid query parameters"),
                        "500": envelope_response("Internal server error")
                    }
                }
            },
            "/users/{id}": {
                "get": {
                    "tags": ["users"],
                    "summary": "Get user by ID",
                    "parameters": [user_id_parameter()],
                    "responses": {
                        "200": json_response("User found", envelope(user.clone())),
                        "400": envelope_response("Invalid user ID"),
                        "404": envelope_response("User not found")
                    }
                },
                "put": {
                    "tags": ["users"],
                    "summary": "Update user",
                    "description": "Only the fields present in the body are changed",
                    "parameters": [user_id_parameter()],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/UpdateUserRequest" }
                            }
                        }
                    },
                    "responses": {
                        "200": json_response("User updated successfully", envelope(user)),
                        "400": envelope_response("Invalid request"),
                        "500": envelope_response("Internal server error")
                    }
                },
                "delete": {
                    "tags": ["users"],
                    "summary": "Delete user",
                    "parameters": [user_id_parameter()],
                    "responses": {
                        "200": envelope_response("User deleted successfully"),
                        "400": envelope_response("Invalid user ID"),
                        "500": envelope_response("Internal server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Response": {
                    "type": "object",
                    "properties": {
                        "code": { "type": "integer", "example": 200 },
                        "message": { "type": "string", "example": "success" },
                        "data": {}
                    },
                    "required": ["code", "message"]
                },
                "User": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "created_at": { "type": "string", "format": "date-time" },
                        "updated_at": { "type": "string", "format": "date-time" },
                        "name": { "type": "string" },
                        "email": { "type": "string", "format": "email" },
                        "age": { "type": "integer", "minimum": 1, "maximum": 150 },
                        "phone": { "type": "string" }
                    },
                    "required": ["id", "created_at", "updated_at", "name", "email", "age", "phone"]
                },
                "CreateUserRequest": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "minLength": 1, "example": "John Doe" },
                        "email": { "type": "string", "format": "email", "example": "john@example.com" },
                        "age": { "type": "integer", "minimum": 1, "maximum": 150, "example": 25 },
                        "phone": { "type": "string", "example": "1234567890" }
                    },
                    "required": ["name", "email", "age"]
                },
                "UpdateUserRequest": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "email": { "type": "string", "format": "email" },
                        "age": { "type": "integer", "minimum": 1, "maximum": 150 },
                        "phone": { "type": "string" }
                    }
                },
                "UserList": {
                    "type": "object",
                    "properties": {
                        "users": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/User" }
                        },
                        "total": { "type": "integer", "minimum": 0 },
                        "page": { "type": "integer", "minimum": 1 },
                        "page_size": { "type": "integer", "minimum": 1, "maximum": 100 }
                    },
                    "required": ["users", "total", "page", "page_size"]
                }
            }
        },
        "tags": [
            {
                "name": "users",
                "description": "User management"
            }
        ]
    })
}

/// Get OpenAPI specification
pub async fn openapi_spec() -> Json<Value> {
    Json(openapi_document())
}

/// Serve Swagger UI HTML
pub async fn swagger_ui() -> Html<&'static str> {
    Html(r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>User API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@4.15.5/swagger-ui.css" />
    <style>
        body {
            margin: 0;
            background: #fafafa;
        }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@4.15.5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@4.15.5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({
                url: '/swagger/openapi.json',
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                validatorUrl: null,
                supportedSubmitMethods: ['get', 'post', 'put', 'delete']
            });
        };
    </script>
</body>
</html>
    "#)
}

/// Create documentation routes
pub fn docs_routes() -> Router {
    Router::new()
        .route("/swagger", get(swagger_ui))
        .route("/swagger/index.html", get(swagger_ui))
        .route("/swagger/openapi.json", get(openapi_spec))
}
