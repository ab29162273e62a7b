//! JSON Schema for the entry-set section.

use serde_json::{Value, json};

/// Draft-07 schema describing an `mcpServers` object.
///
/// The entry definition is the union of both transports, with
/// `oneOf` requiring exactly one of `command` or `url`.
pub fn servers_schema() -> Value {
    let string_map = json!({
        "type": "object",
        "additionalProperties": {"type": "string"}
    });
    let string_list = json!({
        "type": "array",
        "items": {"type": "string"}
    });

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "MCP Servers Configuration",
        "description": "Named MCP server entries keyed by server name",
        "type": "object",
        "additionalProperties": {"$ref": "#/definitions/ServerEntry"},
        "definitions": {
            "ServerEntry": {
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Executable launched for a stdio server"
                    },
                    "args": {
                        "oneOf": [string_list, {"type": "string"}],
                        "description": "Arguments passed to the command; a single string is read as one argument"
                    },
                    "cwd": {"type": "string", "description": "Working directory for the command"},
                    "env": {
                        "allOf": [string_map],
                        "description": "Environment variables for the command"
                    },
                    "url": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Endpoint of a remote server"
                    },
                    "type": {
                        "type": "string",
                        "enum": ["stdio", "sse", "streamableHttp", "streamable-http", "http"],
                        "description": "Transport; 'streamable-http' is read as 'streamableHttp'"
                    },
                    "httpHeaders": {
                        "allOf": [string_map],
                        "description": "Extra HTTP headers sent to a remote server"
                    },
                    "bearerTokenEnvVar": {
                        "type": "string",
                        "description": "Environment variable holding a bearer token for a remote server"
                    },
                    "enabled": {"type": "boolean", "default": true},
                    "disabled": {
                        "type": "boolean",
                        "description": "Legacy inverse of 'enabled'; ignored when 'enabled' is present"
                    },
                    "alwaysAllow": {
                        "type": "array",
                        "items": {"type": "string"},
                        "uniqueItems": true,
                        "description": "Tools approved without prompting"
                    },
                    "timeout": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Timeout in seconds"
                    },
                    "trust": {"type": "boolean"}
                },
                "oneOf": [
                    {"required": ["command"]},
                    {"required": ["url"]}
                ],
                "additionalProperties": true
            }
        }
    })
}
