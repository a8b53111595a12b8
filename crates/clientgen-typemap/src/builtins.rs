//! Built-in name tables.
//!
//! Lookups are by simple name; namespaces are stripped by the caller.

/// Opaque fallback for backend-internal types.
pub const ANY: &str = "any";
/// No payload.
pub const VOID: &str = "void";
/// Text primitive; a dictionary keyed by it becomes a `Record`.
pub const STRING: &str = "string";

/// Primitive and infrastructure types, keyed by simple name.
pub fn primitive(name: &str) -> Option<&'static str> {
    let mapped = match name {
        // text
        "string" | "String" | "char" | "Char" => STRING,
        // numeric
        "byte" | "Byte" | "sbyte" | "SByte" | "short" | "Int16" | "ushort" | "UInt16"
        | "int" | "Int32" | "uint" | "UInt32" | "long" | "Int64" | "ulong" | "UInt64"
        | "float" | "Single" | "double" | "Double" | "decimal" | "Decimal" | "Half"
        | "nint" | "nuint" => "number",
        "BigInteger" | "Int128" | "UInt128" => STRING,
        // boolean
        "bool" | "Boolean" => "boolean",
        // temporal
        "DateTime" | "DateTimeOffset" | "DateOnly" | "TimeOnly" | "TimeSpan" => STRING,
        // identifiers
        "Guid" | "Uri" | "Ulid" => STRING,
        // binary streams and file results
        "Stream" | "MemoryStream" | "FileStream" | "FileResult" | "FileContentResult"
        | "FileStreamResult" | "PhysicalFileResult" | "VirtualFileResult" => "Blob",
        // uploads
        "IFormFile" => "File",
        "IFormFileCollection" => "File[]",
        "void" | "Void" => VOID,
        // untyped payloads
        "object" | "Object" | "dynamic" | "JsonElement" | "JsonDocument" | "JsonNode"
        | "JsonObject" | "JObject" | "JToken" | "JArray" | "ExpandoObject" => ANY,
        _ if is_infrastructure(name) => ANY,
        _ => return None,
    };
    Some(mapped)
}

/// Backend plumbing that must never leak into the client contract.
pub fn is_infrastructure(name: &str) -> bool {
    matches!(
        name,
        "CancellationToken"
            | "HttpContext"
            | "HttpRequest"
            | "HttpResponse"
            | "ClaimsPrincipal"
            | "IMediator"
            | "ISender"
            | "IPublisher"
            | "IDispatcher"
            | "IMapper"
            | "IServiceProvider"
            | "ILogger"
            | "ILoggerFactory"
            | "IConfiguration"
            | "IOptions"
            | "IWebHostEnvironment"
            | "IHttpContextAccessor"
            | "DbContext"
            | "LinkGenerator"
    )
}

/// Names that carry another type and are erased (`Task<T>` → `T`).
pub fn is_erased_wrapper(name: &str) -> bool {
    matches!(
        name,
        "Nullable"
            | "Optional"
            | "Task"
            | "ValueTask"
            | "ActionResult"
            | "Ok"
            | "Created"
            | "CreatedAtRoute"
            | "Accepted"
            | "AcceptedAtRoute"
    )
}

/// Non-generic forms of wrappers that carry nothing.
pub fn is_empty_result(name: &str) -> bool {
    matches!(
        name,
        "Task"
            | "ValueTask"
            | "IActionResult"
            | "ActionResult"
            | "IResult"
            | "NoContent"
            | "Ok"
            | "Accepted"
    )
}

/// Outcome wrapper preserved on the client as `Result<T>`.
pub fn is_outcome(name: &str) -> bool {
    matches!(name, "Result" | "OperationResult")
}

/// Minimal-API typed unions (`Results<Ok<T>, NotFound>`).
pub fn is_result_union(name: &str) -> bool {
    name == "Results"
}

pub fn is_map(name: &str) -> bool {
    matches!(
        name,
        "Dictionary"
            | "IDictionary"
            | "IReadOnlyDictionary"
            | "SortedDictionary"
            | "SortedList"
            | "ConcurrentDictionary"
            | "ImmutableDictionary"
            | "IImmutableDictionary"
    )
}

pub fn is_set(name: &str) -> bool {
    matches!(
        name,
        "HashSet"
            | "ISet"
            | "SortedSet"
            | "IReadOnlySet"
            | "ImmutableHashSet"
            | "ImmutableSortedSet"
    )
}

pub fn is_tuple(name: &str) -> bool {
    matches!(name, "ValueTuple" | "Tuple")
}

/// Every C# primitive name in the table, for exhaustive tests.
pub const PRIMITIVE_NAMES: &[&str] = &[
    "string", "String", "char", "Char", "byte", "Byte", "sbyte", "SByte", "short", "Int16",
    "ushort", "UInt16", "int", "Int32", "uint", "UInt32", "long", "Int64", "ulong", "UInt64",
    "float", "Single", "double", "Double", "decimal", "Decimal", "Half", "nint", "nuint",
    "BigInteger", "Int128", "UInt128", "bool", "Boolean", "DateTime", "DateTimeOffset",
    "DateOnly", "TimeOnly", "TimeSpan", "Guid", "Uri", "Ulid", "Stream", "MemoryStream",
    "FileStream", "FileResult", "FileContentResult", "FileStreamResult", "PhysicalFileResult",
    "VirtualFileResult", "IFormFile", "IFormFileCollection", "void", "Void", "object", "Object",
    "dynamic", "JsonElement", "JsonDocument", "JsonNode", "JsonObject", "JObject", "JToken",
    "JArray", "ExpandoObject", "CancellationToken", "HttpContext", "HttpRequest",
    "HttpResponse", "ClaimsPrincipal", "IMediator", "ISender",
];
