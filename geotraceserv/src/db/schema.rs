// Diesel schema definition for the submissions store
use diesel::table;

table! {
    submissions (id) {
        id -> BigInt,
        created_at -> Text,

        public_ip -> Nullable<Text>,
        public_ipv4 -> Nullable<Text>,
        public_ipv6 -> Nullable<Text>,

        country -> Nullable<Text>,
        region -> Nullable<Text>,
        city -> Nullable<Text>,
        postal -> Nullable<Text>,

        isp -> Nullable<Text>,
        org -> Nullable<Text>,
        asn -> Nullable<Text>,

        ip_lat -> Nullable<Double>,
        ip_lon -> Nullable<Double>,

        gps_lat -> Nullable<Double>,
        gps_lon -> Nullable<Double>,
        gps_accuracy_m -> Nullable<Double>,

        is_vpn -> Nullable<BigInt>,
        is_proxy -> Nullable<BigInt>,
        is_tor -> Nullable<BigInt>,

        device_name -> Nullable<Text>,
        platform -> Nullable<Text>,
        language -> Nullable<Text>,
        timezone -> Nullable<Text>,
        screen -> Nullable<Text>,
        viewport -> Nullable<Text>,
        device_pixel_ratio -> Nullable<Double>,
        touch_points -> Nullable<BigInt>,
        user_agent -> Nullable<Text>,

        referrer -> Nullable<Text>,
        page_url -> Nullable<Text>,
    }
}
