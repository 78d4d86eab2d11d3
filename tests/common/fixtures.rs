//! Test fixtures: RFC 7643 example resources and the filter corpus.

/// RFC 7643 examples as constants for easy reference
pub mod rfc_examples {
    use serde_json::{Value, json};

    /// RFC 7643 Section 8.1 - Minimal User representation
    pub fn user_minimal() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "2819c223-7f76-453a-919d-413861904646",
            "userName": "bjensen@example.com",
            "meta": {
                "resourceType": "User",
                "created": "2010-01-23T04:56:22Z",
                "lastModified": "2011-05-13T04:42:34Z",
                "version": "W/\"3694e05e9dff590\"",
                "location": "https://example.com/v2/Users/2819c223-7f76-453a-919d-413861904646"
            }
        })
    }

    /// RFC 7643 Section 8.2 - Full User representation
    pub fn user_full() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "2819c223-7f76-453a-919d-413861904646",
            "externalId": "701984",
            "userName": "bjensen@example.com",
            "name": {
                "formatted": "Ms. Barbara J Jensen, III",
                "familyName": "Jensen",
                "givenName": "Barbara",
                "middleName": "Jane",
                "honorificPrefix": "Ms.",
                "honorificSuffix": "III"
            },
            "displayName": "Babs Jensen",
            "nickName": "Babs",
            "profileUrl": "https://login.example.com/bjensen",
            "emails": [
                {
                    "value": "bjensen@example.com",
                    "type": "work",
                    "primary": true
                },
                {
                    "value": "babs@jensen.org",
                    "type": "home"
                }
            ],
            "addresses": [
                {
                    "type": "work",
                    "streetAddress": "100 Universal City Plaza",
                    "locality": "Hollywood",
                    "region": "CA",
                    "postalCode": "91608",
                    "country": "USA",
                    "primary": true
                },
                {
                    "type": "home",
                    "streetAddress": "456 Hollywood Blvd",
                    "locality": "Hollywood",
                    "region": "CA",
                    "postalCode": "91608",
                    "country": "USA"
                }
            ],
            "phoneNumbers": [
                {"value": "555-555-5555", "type": "work"},
                {"value": "555-555-4444", "type": "mobile"}
            ],
            "userType": "Employee",
            "title": "Tour Guide",
            "preferredLanguage": "en-US",
            "locale": "en-US",
            "timezone": "America/Los_Angeles",
            "active": true,
            "groups": [
                {
                    "value": "e9e30dba-f08f-4109-8486-d5c6a331660a",
                    "display": "Tour Guides"
                },
                {
                    "value": "fc348aa8-3835-40eb-a20b-c726e15c55b5",
                    "display": "Employees"
                },
                {
                    "value": "71ddacd2-a8e7-49b8-a5db-ae50d0a5bfd7",
                    "display": "US Employees"
                }
            ],
            "meta": {
                "resourceType": "User",
                "created": "2010-01-23T04:56:22Z",
                "lastModified": "2011-05-13T04:42:34Z",
                "version": "W/\"a330bc54f0671c9\"",
                "location": "https://example.com/v2/Users/2819c223-7f76-453a-919d-413861904646"
            }
        })
    }

    /// RFC 7643 Section 8.3 - Enterprise User extension representation
    pub fn user_enterprise() -> Value {
        let mut user = user_full();

        user["schemas"] = json!([
            "urn:ietf:params:scim:schemas:core:2.0:User",
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
        ]);
        user["urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"] = json!({
            "employeeNumber": "701984",
            "costCenter": "4130",
            "organization": "Universal Studios",
            "division": "Theme Park",
            "department": "Tour Operations",
            "manager": {
                "value": "26118915-6090-4610-87e4-49d8ca9f808d",
                "displayName": "John Smith"
            }
        });

        user
    }

    /// RFC 7643 Section 8.4 - Group representation
    pub fn group_basic() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
            "id": "e9e30dba-f08f-4109-8486-d5c6a331660a",
            "displayName": "Tour Guides",
            "members": [
                {
                    "value": "2819c223-7f76-453a-919d-413861904646",
                    "display": "Babs Jensen"
                },
                {
                    "value": "902c246b-6245-4190-8e05-00816be7344a",
                    "display": "Mandy Pepperidge"
                }
            ],
            "meta": {
                "resourceType": "Group",
                "created": "2010-01-23T04:56:22Z",
                "lastModified": "2011-05-13T04:42:34Z",
                "version": "W/\"3694e05e9dff592\"",
                "location": "https://example.com/v2/Groups/e9e30dba-f08f-4109-8486-d5c6a331660a"
            }
        })
    }
}

/// Filters from RFC 7644 section 3.4.2.2 paired with their query rendering.
pub const RFC_FILTERS: &[(&str, &str)] = &[
    ("userName eq \"bjensen\"", "userName:\"bjensen\""),
    ("name.familyName co \"O'Malley\"", "name.familyName:\"O'Malley\""),
    ("userName sw \"J\"", "userName:\"J*\""),
    (
        "urn:ietf:params:scim:schemas:core:2.0:User:userName sw \"J\"",
        "urn\\:ietf\\:params\\:scim\\:schemas\\:core\\:2.0\\:User\\:userName:\"J*\"",
    ),
    ("title pr", "_exists_:title"),
    (
        "meta.lastModified gt \"2011-05-13T04:42:34Z\"",
        "meta.lastModified:{2011-05-13T04:42:34.000Z TO *]",
    ),
    (
        "meta.lastModified ge \"2011-05-13T04:42:34Z\"",
        "meta.lastModified:[2011-05-13T04:42:34.000Z TO *]",
    ),
    (
        "meta.lastModified lt \"2011-05-13T04:42:34Z\"",
        "meta.lastModified:[* TO 2011-05-13T04:42:34.000Z}",
    ),
    (
        "meta.lastModified le \"2011-05-13T04:42:34Z\"",
        "meta.lastModified:[* TO 2011-05-13T04:42:34.000Z]",
    ),
    (
        "title pr and userType eq \"Employee\"",
        "(_exists_:title AND userType:\"Employee\")",
    ),
    (
        "title pr or userType eq \"Intern\"",
        "(_exists_:title OR userType:\"Intern\")",
    ),
    (
        "userType eq \"Employee\" and (emails co \"example.com\" or emails.value co \"example.org\")",
        "(userType:\"Employee\" AND (emails:\"example.com\" OR emails.value:\"example.org\"))",
    ),
    (
        "userType ne \"Employee\" and not (emails co \"example.com\" or emails.value co \"example.org\")",
        "(!(userType:\"Employee\") AND !((emails:\"example.com\" OR emails.value:\"example.org\")))",
    ),
    (
        "userType eq \"Employee\" and emails[type eq \"work\" and value co \"@example.com\"]",
        "(userType:\"Employee\" AND (emails.type:\"work\" AND emails.value:\"@example.com\"))",
    ),
];
