// Kept in sync by hand with `repository::pool::SCHEMA_SQL`.

diesel::table! {
    endpoints (access_url) {
        access_url -> Text,
        status -> Text,
        triples_amount -> Nullable<BigInt>,
        classes_amount -> Nullable<BigInt>,
        signature -> Nullable<Text>,
        document -> Text,
        schema_version -> Integer,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    endpoint_domains (access_url, domain) {
        access_url -> Text,
        domain -> Text,
    }
}

diesel::joinable!(endpoint_domains -> endpoints (access_url));

diesel::allow_tables_to_appear_in_same_query!(endpoint_domains, endpoints);
