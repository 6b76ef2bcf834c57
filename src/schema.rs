diesel::table! {
    device (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    weather (id) {
        id -> Integer,
        temperature -> Double,
        humidity -> Double,
        device -> Integer,
        timestamp -> Text,
    }
}

diesel::joinable!(weather -> device (device));

diesel::allow_tables_to_appear_in_same_query!(device, weather,);
